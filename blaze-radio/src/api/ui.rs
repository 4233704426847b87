//! Landing page

use axum::response::Html;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>102.7 The Blaze</title>
  <style>
    body { background: #111; color: #f5a623; font-family: sans-serif; text-align: center; padding-top: 4em; }
    audio { width: 80%; max-width: 480px; margin: 2em auto; }
    .hint { color: #888; font-size: 0.9em; }
    #now { color: #eee; }
  </style>
</head>
<body>
  <h1>🔥 102.7 The Blaze is LIVE! 🔥</h1>
  <p>Blaze Baxter spinning the righteous rock of 1986, all night long.</p>
  <audio controls autoplay>
    <source src="/stream.mp3" type="audio/mpeg">
    Your browser does not support the audio element.
  </audio>
  <p id="now"></p>
  <p class="hint">Or open <code>/stream.mp3</code> in VLC.</p>
  <script>
    const now = document.getElementById("now");
    const events = new EventSource("/events");
    events.addEventListener("SegmentPublished", (e) => {
      const np = JSON.parse(e.data).now_playing;
      now.textContent = "Now playing: " + np.artist + " - " + np.title;
    });
  </script>
</body>
</html>
"#;

/// GET / - landing page with a player pointed at the stream
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_points_at_stream() {
        assert!(INDEX_HTML.contains("<source src=\"/stream.mp3\" type=\"audio/mpeg\">"));
        assert!(INDEX_HTML.contains("102.7 The Blaze is LIVE!"));
    }
}
