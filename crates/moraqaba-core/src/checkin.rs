#![forbid(unsafe_code)]

//! Simulated biometric check-in.
//!
//! No frame is captured and no face is matched. Once a scan is started it
//! always succeeds: the pane shows a scanning overlay for [`SCAN_DURATION`],
//! then a success overlay for [`SUCCESS_HOLD`], then reports
//! [`CheckInOutcome::Completed`] with `verified: true`, exactly once.
//!
//! ```text
//!   Idle ──mount──▶ Ready ──start_scan──▶ Scanning ──3000ms──▶ Success ──1500ms──▶ Completed
//!     └────mount (denied)──▶ NoCamera
//! ```
//!
//! The state machine does not own a clock. [`CheckInSimulator::pending_timer`]
//! names the timer the host must run next; the host calls
//! [`CheckInSimulator::timer_fired`] when it elapses. Tearing the pane down
//! drops the stream and forgets any pending timer.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::camera::{CameraDevice, CameraError, CameraStream};

/// How long the scanning overlay is shown.
pub const SCAN_DURATION: Duration = Duration::from_millis(3000);
/// How long the success overlay is held before completion is reported.
pub const SUCCESS_HOLD: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInPhase {
    /// Waiting for the camera.
    Idle,
    /// Camera refused; the permission prompt stays up.
    NoCamera(CameraError),
    /// Live preview, waiting for the user to start.
    Ready,
    Scanning,
    Success,
    /// Completion has been reported.
    Completed,
}

impl CheckInPhase {
    pub const fn name(&self) -> &'static str {
        match self {
            CheckInPhase::Idle => "idle",
            CheckInPhase::NoCamera(_) => "no_camera",
            CheckInPhase::Ready => "ready",
            CheckInPhase::Scanning => "scanning",
            CheckInPhase::Success => "success",
            CheckInPhase::Completed => "completed",
        }
    }
}

/// Timer the host must run for the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckInTimer {
    Scan,
    Hold,
}

impl CheckInTimer {
    pub const fn duration(self) -> Duration {
        match self {
            CheckInTimer::Scan => SCAN_DURATION,
            CheckInTimer::Hold => SUCCESS_HOLD,
        }
    }
}

/// Result handed to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// Always `verified: true`; the simulation has no failure path.
    Completed { verified: bool },
}

#[derive(Debug)]
pub struct CheckInSimulator {
    phase: CheckInPhase,
    stream: Option<CameraStream>,
}

impl Default for CheckInSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckInSimulator {
    pub const fn new() -> Self {
        Self {
            phase: CheckInPhase::Idle,
            stream: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> &CheckInPhase {
        &self.phase
    }

    /// Whether a live stream is currently held.
    #[inline]
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Request the camera. Only meaningful from `Idle`.
    pub fn mount(&mut self, camera: &mut dyn CameraDevice) -> &CheckInPhase {
        if self.phase != CheckInPhase::Idle {
            return &self.phase;
        }
        match camera.acquire() {
            Ok(stream) => {
                debug!(label = stream.label(), "camera stream bound to preview");
                self.stream = Some(stream);
                self.phase = CheckInPhase::Ready;
            }
            Err(e) => {
                warn!(error = %e, "camera access denied");
                self.phase = CheckInPhase::NoCamera(e);
            }
        }
        &self.phase
    }

    /// Start the scan. Returns `false` (and does nothing) unless `Ready`.
    pub fn start_scan(&mut self) -> bool {
        if self.phase != CheckInPhase::Ready {
            debug!(phase = self.phase.name(), "start_scan ignored");
            return false;
        }
        info!("simulated biometric scan started");
        self.phase = CheckInPhase::Scanning;
        true
    }

    /// Timer the host should be running right now, if any.
    pub fn pending_timer(&self) -> Option<CheckInTimer> {
        match self.phase {
            CheckInPhase::Scanning => Some(CheckInTimer::Scan),
            CheckInPhase::Success => Some(CheckInTimer::Hold),
            _ => None,
        }
    }

    /// Advance after `timer` elapsed.
    ///
    /// A timer that does not match the current phase is ignored, so a late or
    /// duplicate firing can never report completion twice.
    pub fn timer_fired(&mut self, timer: CheckInTimer) -> Option<CheckInOutcome> {
        match (&self.phase, timer) {
            (CheckInPhase::Scanning, CheckInTimer::Scan) => {
                self.phase = CheckInPhase::Success;
                debug!("scan window elapsed");
                None
            }
            (CheckInPhase::Success, CheckInTimer::Hold) => {
                self.phase = CheckInPhase::Completed;
                info!("check-in completed");
                Some(CheckInOutcome::Completed { verified: true })
            }
            (phase, timer) => {
                debug!(phase = phase.name(), ?timer, "stale check-in timer ignored");
                None
            }
        }
    }

    /// Tear the pane down: release the camera and reset to `Idle`.
    pub fn unmount(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
        }
        self.phase = CheckInPhase::Idle;
    }
}
