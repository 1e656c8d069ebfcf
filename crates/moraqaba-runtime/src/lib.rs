#![forbid(unsafe_code)]

//! Moraqaba Runtime
//!
//! Elm-style terminal runtime: a [`Model`] receives messages, returns [`Cmd`]
//! effects and declares [`Subscription`]s; the [`Program`] drives it against a
//! crossterm terminal, and the [`ProgramSimulator`] drives it in tests on a
//! virtual clock.

pub mod event;
pub mod frame;
pub mod program;
pub mod simulator;
pub mod subscription;
pub mod terminal_session;
pub mod terminal_writer;

pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use frame::{Buffer, Cell, Color, Frame, Rect, Style};
pub use program::{Cmd, Model, Program, ProgramConfig, TaskSpec};
pub use simulator::{CmdRecord, ProgramSimulator};
pub use subscription::{After, Every, StopSignal, SubId, Subscription, Timing};
pub use terminal_session::{SessionOptions, TerminalSession};
pub use terminal_writer::{PresentStats, ScreenMode, TerminalWriter};
