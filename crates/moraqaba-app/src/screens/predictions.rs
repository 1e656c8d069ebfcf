#![forbid(unsafe_code)]

//! Predictions pane.
//!
//! Every activation clears the previous text and starts a fresh fetch on a
//! background task. Results carry the generation they were requested for;
//! anything older than the latest request, or arriving while the pane is not
//! shown, is dropped.

use std::sync::Arc;

use moraqaba_core::mock::{PREDICTION_FACTORS, RECOMMENDED_ACTIONS};
use moraqaba_core::{Prediction, PredictionFetcher, PredictionSource};
use moraqaba_runtime::{Cmd, Frame, KeyEvent, Rect};
use tracing::{debug, info};

use super::{Screen, card, columns, print_centered};
use crate::app::AppMsg;
use crate::theme;

pub type SharedFetcher = Arc<PredictionFetcher<Arc<dyn PredictionSource>>>;

pub const LOADING_TEXT: &str = "Génération de l'analyse...";

pub struct PredictionsPane {
    fetcher: SharedFetcher,
    generation: u64,
    prediction: Option<Prediction>,
    frame_no: u64,
}

impl PredictionsPane {
    pub fn new(source: Arc<dyn PredictionSource>) -> Self {
        Self {
            fetcher: Arc::new(PredictionFetcher::new(source)),
            generation: 0,
            prediction: None,
            frame_no: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.prediction.is_none()
    }

    /// Clear the text and request a new prediction.
    pub fn activate(&mut self) -> Cmd<AppMsg> {
        self.generation += 1;
        self.prediction = None;
        let generation = self.generation;
        let fetcher = Arc::clone(&self.fetcher);
        info!(generation, "prediction requested");
        Cmd::task_named("prediction", move || AppMsg::PredictionReady {
            generation,
            prediction: fetcher.fetch(),
        })
    }

    /// Store `prediction` if it answers the latest request and the pane is
    /// still shown. Returns whether it was kept.
    pub fn deliver(&mut self, generation: u64, prediction: Prediction, shown: bool) -> bool {
        if generation != self.generation || !shown {
            debug!(
                generation,
                latest = self.generation,
                shown,
                "stale prediction discarded"
            );
            return false;
        }
        self.prediction = Some(prediction);
        true
    }

    pub fn tick(&mut self) {
        self.frame_no = self.frame_no.wrapping_add(1);
    }
}

impl Screen for PredictionsPane {
    fn update(&mut self, _key: &KeyEvent) -> Cmd<AppMsg> {
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(90);
        let col = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);
        let mut y = 1;
        print_centered(frame, col.row(y), "▲", theme::success());
        y += 2;
        print_centered(frame, col.row(y), "Analyse Prédictive IA", theme::heading());
        y += 2;

        match &self.prediction {
            Some(prediction) => {
                let quote = format!("\u{201c}{}\u{201d}", prediction.text);
                let lines = moraqaba_runtime::frame::wrap(&quote, width.saturating_sub(6) as usize);
                let h = lines.len() as u16 + 2;
                let panel = Rect::new(col.x, col.y + y, col.width, h);
                frame.buffer.fill(Rect::new(panel.x, panel.y, 1, panel.height), theme::success_overlay());
                let text = Rect::new(panel.x + 3, panel.y + 1, panel.width.saturating_sub(6), h - 2);
                for (i, line) in lines.iter().enumerate() {
                    frame.print(text.row(i as u16), line, theme::quote());
                }
                y += h + 1;
            }
            None => {
                const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
                let glyph = SPINNER[(self.frame_no % 4) as usize];
                print_centered(frame, col.row(y), &format!("{glyph} {LOADING_TEXT}"), theme::faint());
                y += 2;
            }
        }

        let boxes = Rect::new(col.x, col.y + y, col.width, PREDICTION_FACTORS.len() as u16 + 3);
        let halves = columns(boxes, 2, theme::SM);
        let factors = card(frame, halves[0], "Facteurs Influents");
        for (i, item) in PREDICTION_FACTORS.iter().enumerate() {
            frame.print(factors.row(i as u16 + 1), &format!(" • {item}"), theme::accent());
        }
        frame.buffer.fill(halves[1], theme::dark_panel());
        let plan = halves[1].inset(1);
        frame.print(plan, "Plan d'action", theme::scan_overlay());
        for (i, item) in RECOMMENDED_ACTIONS.iter().enumerate() {
            frame.print(plan.row(i as u16 + 1), &format!(" • {item}"), theme::dark_panel());
        }
    }

    fn title(&self) -> &'static str {
        "predictions"
    }
}
