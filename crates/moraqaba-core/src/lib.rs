#![forbid(unsafe_code)]

//! Moraqaba Core
//!
//! Domain layer for the Moraqaba attendance and civic-feedback dashboard.
//! Nothing in this crate touches the terminal or the network; every external
//! collaborator (camera, text-generation service) sits behind a trait.
//!
//! # Key Components
//!
//! - [`Session`] - View Router: Landing → Login → App, with logout
//! - [`tabs_for`] - Role-gated navigation table
//! - [`CheckInSimulator`] - Timed, simulated biometric check-in
//! - [`PredictionFetcher`] - One-shot text generation with a named fallback policy
//! - [`mock`] - Fixed demo data (attendance, weekly stats, reviews, regions)

pub mod camera;
pub mod checkin;
pub mod mock;
pub mod nav;
pub mod prediction;
pub mod records;
pub mod role;
pub mod session;
pub mod user;

pub use camera::{CameraDevice, CameraError, CameraStream, SimulatedCamera};
pub use checkin::{
    CheckInOutcome, CheckInPhase, CheckInSimulator, CheckInTimer, SCAN_DURATION, SUCCESS_HOLD,
};
pub use nav::{Tab, tabs_for};
pub use prediction::{
    EMPTY_RESPONSE_TEXT, FALLBACK_PREDICTION, FallbackPolicy, PREDICTION_PROMPT, Prediction,
    PredictionError, PredictionFetcher, PredictionOrigin, PredictionSource,
};
pub use records::{
    AttendanceRecord, AttendanceStatus, CheckInTime, Feedback, Rating, RatingError, Region,
};
pub use role::Role;
pub use session::{EntryKind, Session, SessionAction, SessionError, Transition, View};
pub use user::{LoginError, LoginForm, User};
