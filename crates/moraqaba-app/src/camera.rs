#![forbid(unsafe_code)]

//! Camera backends for the binary.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use moraqaba_core::camera::TrackRelease;
use moraqaba_core::{CameraDevice, CameraError, CameraStream, SimulatedCamera};
use tracing::{debug, info};

/// Default V4L2 capture node.
pub const DEFAULT_DEVICE: &str = "/dev/video0";

/// Which camera the check-in pane should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraChoice {
    /// Always grant (in-process simulation).
    Grant,
    /// Always refuse, as if the user declined the permission prompt.
    Deny,
    /// Open the local capture device.
    Probe,
}

impl FromStr for CameraChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grant" => Ok(CameraChoice::Grant),
            "deny" => Ok(CameraChoice::Deny),
            "probe" => Ok(CameraChoice::Probe),
            other => Err(format!("unknown camera source: {other}")),
        }
    }
}

impl fmt::Display for CameraChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CameraChoice::Grant => "grant",
            CameraChoice::Deny => "deny",
            CameraChoice::Probe => "probe",
        })
    }
}

pub fn build_camera(choice: CameraChoice) -> Box<dyn CameraDevice> {
    info!(camera = %choice, "camera backend selected");
    match choice {
        CameraChoice::Grant => Box::new(SimulatedCamera::granting()),
        CameraChoice::Deny => Box::new(SimulatedCamera::denying()),
        CameraChoice::Probe => Box::new(DeviceProbe::new(DEFAULT_DEVICE)),
    }
}

/// Holds the capture node open for as long as the stream lives.
///
/// No frame is ever read; holding the handle is what makes the device show
/// as busy, and closing it is the release.
pub struct DeviceProbe {
    path: PathBuf,
}

struct DeviceTrack {
    file: Option<File>,
}

impl TrackRelease for DeviceTrack {
    fn stop(&mut self) {
        if self.file.take().is_some() {
            debug!("capture device closed");
        }
    }
}

impl DeviceProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn map_open_error(e: &io::Error) -> CameraError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
        io::ErrorKind::NotFound => CameraError::NotFound,
        _ => CameraError::Unavailable(e.to_string()),
    }
}

impl CameraDevice for DeviceProbe {
    fn acquire(&mut self) -> Result<CameraStream, CameraError> {
        let file = File::open(&self.path).map_err(|e| map_open_error(&e))?;
        let track = DeviceTrack { file: Some(file) };
        Ok(CameraStream::new(
            self.path.display().to_string(),
            vec![Box::new(track)],
        ))
    }
}
