#![forbid(unsafe_code)]

//! Moraqaba terminal dashboard.
//!
//! Wires the domain crate to the runtime: the [`app::AppModel`] screens, the
//! text-generation HTTP client, camera backends, command-line configuration
//! and log setup.

pub mod app;
pub mod camera;
pub mod chrome;
pub mod cli;
pub mod gemini;
pub mod logging;
pub mod screens;
pub mod theme;
