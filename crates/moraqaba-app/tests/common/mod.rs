#![forbid(unsafe_code)]
#![allow(dead_code)]

//! Shared helpers for the app integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use moraqaba_app::app::{AppModel, AppMsg};
use moraqaba_core::{
    CheckInTime, PredictionError, PredictionSource, Role, SimulatedCamera,
};
use moraqaba_runtime::{Event, KeyCode, KeyEvent, Modifiers, ProgramSimulator};

/// Prediction source that replies with a fixed result and counts calls.
pub struct Counting {
    calls: AtomicUsize,
    reply: Result<String, PredictionError>,
}

impl Counting {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
        })
    }

    pub fn failing(error: PredictionError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Err(error),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredictionSource for Counting {
    fn generate(&self, _prompt: &str) -> Result<String, PredictionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

pub fn nine_fifteen() -> CheckInTime {
    CheckInTime::at(9, 15)
}

pub fn simulator(camera: SimulatedCamera, source: Arc<Counting>) -> ProgramSimulator<AppModel> {
    let model = AppModel::new(Box::new(camera), source).with_clock(nine_fifteen);
    let mut sim = ProgramSimulator::new(model);
    sim.init();
    sim
}

pub fn press(sim: &mut ProgramSimulator<AppModel>, code: KeyCode) {
    sim.inject_event(Event::Key(KeyEvent::new(code)));
}

pub fn ctrl(sim: &mut ProgramSimulator<AppModel>, c: char) {
    sim.inject_event(Event::Key(
        KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL),
    ));
}

pub fn type_text(sim: &mut ProgramSimulator<AppModel>, text: &str) {
    for c in text.chars() {
        press(sim, KeyCode::Char(c));
    }
}

/// Sign in through the landing and login screens with the keyboard.
pub fn sign_in(sim: &mut ProgramSimulator<AppModel>, role: Role) {
    if role == Role::Citizen {
        press(sim, KeyCode::Char('c'));
    } else {
        press(sim, KeyCode::Char('p'));
    }
    type_text(sim, "AB123456");
    press(sim, KeyCode::Tab);
    type_text(sim, "secret");
    if role != Role::Citizen {
        press(sim, KeyCode::Tab);
        let steps = Role::PROFESSIONAL
            .iter()
            .position(|r| *r == role)
            .unwrap_or(0);
        for _ in 0..steps {
            press(sim, KeyCode::Right);
        }
    }
    press(sim, KeyCode::Enter);
}

/// Select `n`-th sidebar tab (1-based).
pub fn open_tab(sim: &mut ProgramSimulator<AppModel>, n: u8) {
    press(sim, KeyCode::Char(char::from(b'0' + n)));
}

pub fn send(sim: &mut ProgramSimulator<AppModel>, msg: AppMsg) {
    sim.send(msg);
}
