//! DJ banter: Blaze Baxter's fixed pool of 1986 album-rock lines

use crate::playlist::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Lines read between tracks; one is picked uniformly per cycle
pub const BLAZE_LINES: [&str; 6] = [
    "Crank it up, dudes! This is Blaze Baxter on 102.7 The Blaze—totally righteous rock all night!",
    "Killer set from the Rock-Copter! Traffic's bodacious down at the mall—play that Van Halen loud!",
    "Fake caller alert: 'Blaze, spin some Journey for my Trans Am!' You got it, caller 69!",
    "Time check: It's 8:15, weather's sunny with a chance of headbanging. Win Bon Jovi tickets—call 555-ROCK!",
    "This one goes to eleven! 102.7 WBLZ, where the fringe flies and the aviators shine indoors.",
    "Commercial break: Get your leather jacket at Leather World—fringe included! Back to the rock!",
];

/// Pick one line uniformly at random
pub fn pick_line<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    BLAZE_LINES.choose(rng).copied().unwrap_or(BLAZE_LINES[0])
}

/// Append the "up next" tag naming the upcoming track
pub fn compose_banter(line: &str, track: &Track) -> String {
    format!("{} Up next: {} - {}—crank it!", line, track.artist, track.title)
}
