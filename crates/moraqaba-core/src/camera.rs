#![forbid(unsafe_code)]

//! Camera capture boundary.
//!
//! The check-in pane only needs "grant a video stream" or "deny". A granted
//! [`CameraStream`] owns its tracks and stops them when dropped, so whoever
//! holds the stream releases the device on every exit path.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The user (or the platform) refused access.
    PermissionDenied,
    /// No capture device is present.
    NotFound,
    /// The device exists but could not be opened.
    Unavailable(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "camera permission denied"),
            CameraError::NotFound => write!(f, "no camera device found"),
            CameraError::Unavailable(msg) => write!(f, "camera unavailable: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

/// Releases one track when the owning stream is dropped.
pub trait TrackRelease: Send {
    fn stop(&mut self);
}

/// A live video stream. Dropping it stops every track.
pub struct CameraStream {
    label: String,
    tracks: Vec<Box<dyn TrackRelease>>,
}

impl CameraStream {
    pub fn new(label: impl Into<String>, tracks: Vec<Box<dyn TrackRelease>>) -> Self {
        Self {
            label: label.into(),
            tracks,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

impl fmt::Debug for CameraStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraStream")
            .field("label", &self.label)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
        debug!(label = %self.label, tracks = self.tracks.len(), "camera stream released");
    }
}

/// Source of video streams.
pub trait CameraDevice: Send {
    /// Request a video stream. Video only, default constraints.
    fn acquire(&mut self) -> Result<CameraStream, CameraError>;
}

/// In-process camera that grants or denies on demand and counts live tracks.
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    grant: bool,
    live: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
}

struct CountedTrack {
    live: Arc<AtomicUsize>,
    stopped: bool,
}

impl TrackRelease for CountedTrack {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl SimulatedCamera {
    pub fn granting() -> Self {
        Self::new(true)
    }

    pub fn denying() -> Self {
        Self::new(false)
    }

    fn new(grant: bool) -> Self {
        Self {
            grant,
            live: Arc::new(AtomicUsize::new(0)),
            acquired: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Tracks currently open. Clones share the counter.
    pub fn live_tracks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Streams handed out so far.
    pub fn acquisitions(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl CameraDevice for SimulatedCamera {
    fn acquire(&mut self) -> Result<CameraStream, CameraError> {
        if !self.grant {
            warn!("simulated camera denied access");
            return Err(CameraError::PermissionDenied);
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let track = CountedTrack {
            live: Arc::clone(&self.live),
            stopped: false,
        };
        Ok(CameraStream::new("simulated", vec![Box::new(track)]))
    }
}
