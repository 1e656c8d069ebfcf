#![forbid(unsafe_code)]

//! End-to-end session flows: landing → login → app → logout, per role.

mod common;

use common::{Counting, ctrl, open_tab, press, sign_in, simulator, type_text};
use moraqaba_core::{Role, SimulatedCamera, Tab, View, tabs_for};
use moraqaba_runtime::KeyCode;

#[test]
fn every_role_lands_on_its_dashboard_with_its_tabs() {
    for role in Role::ALL.iter().copied() {
        let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
        sign_in(&mut sim, role);

        let session = sim.model().session();
        assert_eq!(session.view(), View::App, "{role}");
        assert_eq!(session.active_tab(), Tab::Dashboard, "{role}");
        assert_eq!(session.visible_tabs(), tabs_for(role), "{role}");

        let user = session.current_user().expect("signed in");
        assert_eq!(user.role, role);
        assert_eq!(user.national_id.as_deref(), Some("AB123456"));
        assert_eq!(user.facility.is_some(), role == Role::Director, "{role}");
        assert_eq!(user.region.is_some(), role == Role::Ministry, "{role}");
    }
}

#[test]
fn sidebar_shows_exactly_the_role_tabs() {
    for role in Role::ALL.iter().copied() {
        let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
        sign_in(&mut sim, role);
        let frame = sim.capture_frame(140, 40);
        for tab in Tab::ALL {
            // Two tabs share the "Établissements" label.
            if matches!(tab, Tab::FacilityMgt | Tab::Facilities) {
                continue;
            }
            let listed = tabs_for(role).contains(tab);
            assert_eq!(
                frame.contains_text(tab.label()),
                listed,
                "{role} / {}",
                tab.id()
            );
        }
    }
}

#[test]
fn citizen_dashboard_is_the_rating_view() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    sign_in(&mut sim, Role::Citizen);
    let frame = sim.capture_frame(140, 40);
    assert!(frame.contains_text("Évaluez vos services publics"));
    assert!(frame.contains_text("Bonjour, Citoyen Anonyme"));
    assert!(!frame.contains_text("Derniers Check-ins"));
}

#[test]
fn header_uses_tab_heading_off_dashboard() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    sign_in(&mut sim, Role::Director);
    open_tab(&mut sim, 3);
    assert_eq!(sim.model().session().active_tab(), Tab::FacilityStats);
    let frame = sim.capture_frame(140, 40);
    assert!(frame.contains_text("Facility-stats"));
    assert!(frame.contains_text("CHU Ibn Sina"));
}

#[test]
fn logout_clears_user_and_resets_tab() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    sign_in(&mut sim, Role::Ministry);
    open_tab(&mut sim, 2);
    assert_eq!(sim.model().session().active_tab(), Tab::Map);

    ctrl(&mut sim, 'l');
    let session = sim.model().session();
    assert_eq!(session.view(), View::Landing);
    assert!(session.current_user().is_none());
    assert_eq!(session.active_tab(), Tab::Dashboard);

    let frame = sim.capture_frame(140, 40);
    assert!(!frame.contains_text("Utilisateur Santé"));
    assert!(!frame.contains_text("Rabat-Salé-Kénitra"));
    assert!(frame.contains_text("Accès Professionnel"));
}

#[test]
fn back_to_landing_from_login() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    press(&mut sim, KeyCode::Char('p'));
    assert_eq!(sim.model().session().view(), View::Login);
    press(&mut sim, KeyCode::Escape);
    assert_eq!(sim.model().session().view(), View::Landing);
}

#[test]
fn missing_password_keeps_login_view() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    press(&mut sim, KeyCode::Char('c'));
    type_text(&mut sim, "AB1");
    press(&mut sim, KeyCode::Enter);
    assert_eq!(sim.model().session().view(), View::Login);
    assert!(sim.model().session().current_user().is_none());
    assert!(sim.model().login().error().is_some());
}

#[test]
fn citizen_login_has_no_role_selector() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    press(&mut sim, KeyCode::Char('c'));
    let frame = sim.capture_frame(120, 40);
    assert!(frame.contains_text("Bienvenue Citoyen"));
    assert!(!frame.contains_text("Rôle:"));
}

#[test]
fn ctrl_q_quits() {
    let mut sim = simulator(SimulatedCamera::granting(), Counting::ok("x"));
    ctrl(&mut sim, 'q');
    assert!(!sim.is_running());
}

#[test]
fn exit_after_quits_on_virtual_clock() {
    use moraqaba_app::app::AppModel;
    use moraqaba_runtime::ProgramSimulator;
    use std::time::Duration;

    let model = AppModel::new(Box::new(SimulatedCamera::granting()), Counting::ok("x"))
        .with_exit_after(1000);
    let mut sim = ProgramSimulator::new(model);
    sim.init();
    sim.advance(Duration::from_millis(999));
    assert!(sim.is_running());
    sim.advance(Duration::from_millis(1));
    assert!(!sim.is_running());
}
