#![forbid(unsafe_code)]

//! Prediction tab: verbatim text, fixed fallback, one call per activation and
//! the stale-result guard.

mod common;

use common::{Counting, open_tab, sign_in, simulator};
use moraqaba_app::app::AppMsg;
use moraqaba_app::screens::predictions::LOADING_TEXT;
use moraqaba_core::{
    EMPTY_RESPONSE_TEXT, FALLBACK_PREDICTION, Prediction, PredictionError, PredictionOrigin, Role,
    SimulatedCamera, Tab,
};

const PREDICTIONS_TAB: u8 = 3;

#[test]
fn generated_text_is_shown_verbatim() {
    let text = "  Hausse de 4% attendue mardi.\nPrévoir des renforts.  ";
    let source = Counting::ok(text);
    let mut sim = simulator(SimulatedCamera::granting(), source.clone());
    sign_in(&mut sim, Role::Ministry);
    open_tab(&mut sim, PREDICTIONS_TAB);

    assert_eq!(sim.model().session().active_tab(), Tab::Predictions);
    assert_eq!(source.calls(), 1);
    assert_eq!(sim.task_names(), vec![Some("prediction".to_string())]);
    let shown = sim.model().predictions().prediction().expect("delivered");
    assert_eq!(shown.text, text);
    assert_eq!(shown.origin, PredictionOrigin::Generated);
}

#[test]
fn any_failure_shows_the_fixed_fallback() {
    for error in [
        PredictionError::MissingCredential,
        PredictionError::Transport("connection refused".into()),
        PredictionError::Status {
            code: 503,
            body: "overloaded".into(),
        },
        PredictionError::Decode("eof".into()),
    ] {
        let mut sim = simulator(SimulatedCamera::granting(), Counting::failing(error));
        sign_in(&mut sim, Role::Ministry);
        open_tab(&mut sim, PREDICTIONS_TAB);
        let shown = sim.model().predictions().prediction().expect("delivered");
        assert_eq!(shown.text, FALLBACK_PREDICTION);

        let frame = sim.capture_frame(140, 40);
        assert!(frame.contains_text("pour la semaine prochaine"));
        assert!(!frame.contains_text("503"));
    }
}

#[test]
fn empty_response_uses_placeholder_text() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok(""));
    sign_in(&mut sim, Role::Ministry);
    open_tab(&mut sim, PREDICTIONS_TAB);
    let shown = sim.model().predictions().prediction().expect("delivered");
    assert_eq!(shown.text, EMPTY_RESPONSE_TEXT);
}

#[test]
fn reentering_the_tab_calls_again() {
    let source = Counting::ok("a");
    let mut sim = simulator(SimulatedCamera::granting(), source.clone());
    sign_in(&mut sim, Role::Ministry);
    open_tab(&mut sim, PREDICTIONS_TAB);
    open_tab(&mut sim, 2);
    open_tab(&mut sim, PREDICTIONS_TAB);
    assert_eq!(source.calls(), 2);
    assert_eq!(sim.model().predictions().generation(), 2);

    // Re-selecting the active tab is not an activation.
    open_tab(&mut sim, PREDICTIONS_TAB);
    assert_eq!(source.calls(), 2);
}

#[test]
fn stale_generation_is_discarded() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("fresh"));
    sign_in(&mut sim, Role::Ministry);
    open_tab(&mut sim, PREDICTIONS_TAB);
    open_tab(&mut sim, 2);
    open_tab(&mut sim, PREDICTIONS_TAB);
    assert_eq!(sim.model().predictions().generation(), 2);

    sim.send(AppMsg::PredictionReady {
        generation: 1,
        prediction: Prediction {
            text: "stale".into(),
            origin: PredictionOrigin::Generated,
        },
    });
    let shown = sim.model().predictions().prediction().expect("delivered");
    assert_eq!(shown.text, "fresh");
}

#[test]
fn result_arriving_off_tab_is_discarded() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("fresh"));
    sign_in(&mut sim, Role::Ministry);
    open_tab(&mut sim, PREDICTIONS_TAB);
    open_tab(&mut sim, 2);
    let generation = sim.model().predictions().generation();

    sim.send(AppMsg::PredictionReady {
        generation,
        prediction: Prediction {
            text: "late".into(),
            origin: PredictionOrigin::Generated,
        },
    });
    let shown = sim.model().predictions().prediction().expect("earlier result kept");
    assert_eq!(shown.text, "fresh");
}

#[test]
fn loading_indicator_before_result() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    sign_in(&mut sim, Role::Ministry);
    // Drive the pane directly so no task has run yet.
    let _pending = {
        use moraqaba_runtime::Model;
        sim.model_mut()
            .update(AppMsg::Session(moraqaba_core::SessionAction::SelectTab(Tab::Predictions)))
    };
    assert!(sim.model().predictions().is_loading());
    let frame = sim.capture_frame(140, 40);
    assert!(frame.contains_text(LOADING_TEXT));
}
