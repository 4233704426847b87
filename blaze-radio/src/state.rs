//! Shared now-playing state
//!
//! The single piece of mutable state crossing task boundaries. The Program
//! Director is the only writer; every stream connection is a reader.
//!
//! The published segment lives behind an `Arc` swapped under the write lock,
//! so a reader holds either the previous complete segment or the new one.
//! Once a segment has been published the buffer is never empty again.

use crate::playlist::Track;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

/// One cycle's published output
#[derive(Debug, Clone)]
pub struct Segment {
    /// Cycle number that produced this segment (0-based)
    pub cycle: u64,
    /// Track played after the banter
    pub track: Track,
    /// Banter text that was voiced
    pub banter: String,
    /// Encoded MP3 bitstream
    pub bytes: Bytes,
    /// Mixed length in milliseconds
    pub duration_ms: u64,
    /// When the Director published it
    pub published_at: DateTime<Utc>,
}

/// Segment metadata without the audio, for JSON and SSE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub cycle: u64,
    pub artist: String,
    pub title: String,
    pub banter: String,
    pub duration_ms: u64,
    pub size_bytes: usize,
    pub published_at: DateTime<Utc>,
}

impl From<&Segment> for NowPlaying {
    fn from(segment: &Segment) -> Self {
        Self {
            cycle: segment.cycle,
            artist: segment.track.artist.clone(),
            title: segment.track.title.clone(),
            banter: segment.banter.clone(),
            duration_ms: segment.duration_ms,
            size_bytes: segment.bytes.len(),
            published_at: segment.published_at,
        }
    }
}

/// Events pushed to `/events` subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RadioEvent {
    /// The Director replaced the now-playing segment
    SegmentPublished {
        now_playing: NowPlaying,
    },

    /// A stream listener connected or disconnected
    ListenersChanged {
        listeners: usize,
        timestamp: DateTime<Utc>,
    },
}

impl RadioEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            RadioEvent::SegmentPublished { .. } => "SegmentPublished",
            RadioEvent::ListenersChanged { .. } => "ListenersChanged",
        }
    }
}

/// Shared state accessible by the Director and the HTTP layer
pub struct SharedState {
    /// Most recently published segment (None before the first cycle)
    segment: RwLock<Option<Arc<Segment>>>,

    /// Currently connected stream listeners
    listeners: AtomicUsize,

    /// Segments published since startup
    publish_count: AtomicU64,

    /// Event broadcaster for SSE
    event_tx: broadcast::Sender<RadioEvent>,
}

impl SharedState {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            segment: RwLock::new(None),
            listeners: AtomicUsize::new(0),
            publish_count: AtomicU64::new(0),
            event_tx,
        }
    }

    /// Replace the now-playing segment
    pub async fn publish(&self, segment: Segment) {
        let now_playing = NowPlaying::from(&segment);
        {
            let mut guard = self.segment.write().await;
            *guard = Some(Arc::new(segment));
        }
        self.publish_count.fetch_add(1, Ordering::Relaxed);
        self.broadcast_event(RadioEvent::SegmentPublished { now_playing });
    }

    /// Bytes of the current segment, or None before the first publish
    pub async fn current_bytes(&self) -> Option<Bytes> {
        self.segment.read().await.as_ref().map(|s| s.bytes.clone())
    }

    /// The current segment
    pub async fn current_segment(&self) -> Option<Arc<Segment>> {
        self.segment.read().await.clone()
    }

    /// Metadata of the current segment
    pub async fn now_playing(&self) -> Option<NowPlaying> {
        self.segment
            .read()
            .await
            .as_deref()
            .map(NowPlaying::from)
    }

    pub fn publish_count(&self) -> u64 {
        self.publish_count.load(Ordering::Relaxed)
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: RadioEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<RadioEvent> {
        self.event_tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::Relaxed)
    }

    /// Register a stream listener; the count drops when the guard is dropped
    pub fn register_listener(self: &Arc<Self>) -> ListenerGuard {
        let listeners = self.listeners.fetch_add(1, Ordering::Relaxed) + 1;
        self.broadcast_event(RadioEvent::ListenersChanged {
            listeners,
            timestamp: Utc::now(),
        });
        ListenerGuard {
            state: Arc::clone(self),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a listener counted for as long as its stream is alive
pub struct ListenerGuard {
    state: Arc<SharedState>,
}

impl ListenerGuard {
    /// Listener count including this one
    pub fn listeners(&self) -> usize {
        self.state.listener_count()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let listeners = self.state.listeners.fetch_sub(1, Ordering::Relaxed) - 1;
        info!(listeners, "Listener disconnected");
        self.state.broadcast_event(RadioEvent::ListenersChanged {
            listeners,
            timestamp: Utc::now(),
        });
    }
}
