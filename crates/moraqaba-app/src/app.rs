#![forbid(unsafe_code)]

//! Main application model.
//!
//! [`AppModel`] owns the [`Session`] (the View Router) and one state value per
//! pane. Every session action is routed through [`Session::apply`]; the
//! resulting [`Transition`] decides which panes mount and unmount:
//!
//! - entering the check-in tab opens the camera, leaving it releases the
//!   camera and drops the pending timer subscription;
//! - entering the predictions tab starts a fresh fetch every time.

use std::sync::Arc;
use std::time::Duration;

use moraqaba_core::{
    CameraDevice, CheckInOutcome, CheckInTimer, Prediction, PredictionSource, Role, Session,
    SessionAction, SessionError, Tab, Transition, View,
};
use moraqaba_runtime::{
    After, Cmd, Event, Every, Frame, KeyCode, KeyEvent, Model, Rect, SubId, Subscription,
};
use tracing::{debug, info, warn};

use crate::chrome::{self, StatusBarState};
use crate::screens::checkin::{CheckInPane, Clock};
use crate::screens::dashboard::{self, CitizenHome};
use crate::screens::landing::LandingScreen;
use crate::screens::login::LoginScreen;
use crate::screens::map::MapPane;
use crate::screens::predictions::PredictionsPane;
use crate::screens::{HelpEntry, Screen, history, placeholder, reviews};
use crate::theme;

/// Redraw interval for the scan sweep and the loading spinner.
pub const ANIMATION_INTERVAL: Duration = Duration::from_millis(120);

const ANIMATION_SUB_ID: SubId = 0x414E_494D;
const EXIT_SUB_ID: SubId = 0x4558_4954;

/// Application-level message type.
#[derive(Debug)]
pub enum AppMsg {
    Key(KeyEvent),
    Paste(String),
    Resize { width: u16, height: u16 },
    /// Request a View Router transition.
    Session(SessionAction),
    /// A check-in timer elapsed for the scanner opened in `epoch`.
    CheckInTimer { timer: CheckInTimer, epoch: u64 },
    /// A prediction fetch finished.
    PredictionReady {
        generation: u64,
        prediction: Prediction,
    },
    /// Animation frame.
    Tick,
    Quit,
    Noop,
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Self::Key(key),
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Paste(text) => Self::Paste(text),
            Event::Tick => Self::Tick,
            Event::Focus(_) => Self::Noop,
        }
    }
}

/// Top-level application state.
pub struct AppModel {
    session: Session,
    landing: LandingScreen,
    login: LoginScreen,
    citizen_home: CitizenHome,
    checkin: CheckInPane,
    predictions: PredictionsPane,
    map: MapPane,
    exit_after: Option<Duration>,
}

impl AppModel {
    pub fn new(camera: Box<dyn CameraDevice>, source: Arc<dyn PredictionSource>) -> Self {
        Self {
            session: Session::new(),
            landing: LandingScreen::new(),
            login: LoginScreen::new(),
            citizen_home: CitizenHome::new(),
            checkin: CheckInPane::new(camera),
            predictions: PredictionsPane::new(source),
            map: MapPane::new(),
            exit_after: None,
        }
    }

    /// Use `clock` for recorded check-in times.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.checkin = self.checkin.with_clock(clock);
        self
    }

    /// Quit automatically after `ms` milliseconds; 0 disables.
    #[must_use]
    pub fn with_exit_after(mut self, ms: u64) -> Self {
        self.exit_after = (ms > 0).then(|| Duration::from_millis(ms));
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn login(&self) -> &LoginScreen {
        &self.login
    }

    pub fn checkin(&self) -> &CheckInPane {
        &self.checkin
    }

    pub fn predictions(&self) -> &PredictionsPane {
        &self.predictions
    }

    pub fn map(&self) -> &MapPane {
        &self.map
    }

    fn on_tab(&self, tab: Tab) -> bool {
        self.session.view() == View::App && self.session.active_tab() == tab
    }

    fn is_citizen(&self) -> bool {
        self.session
            .current_user()
            .is_some_and(|user| user.role == Role::Citizen)
    }

    // -----------------------------------------------------------------------
    // Session routing
    // -----------------------------------------------------------------------

    fn apply_session(&mut self, action: SessionAction) -> Cmd<AppMsg> {
        let name = action.name();
        match self.session.apply(action) {
            Ok(transition) => self.on_transition(transition),
            Err(SessionError::Login(error)) => {
                debug!(%error, "login form incomplete");
                self.login.set_error(error);
                Cmd::none()
            }
            Err(error) => {
                warn!(action = name, %error, "session action rejected");
                Cmd::none()
            }
        }
    }

    fn on_transition(&mut self, transition: Transition) -> Cmd<AppMsg> {
        match transition {
            Transition::ViewChanged { from, to } => {
                info!(?from, ?to, "view changed");
                if from == View::App {
                    self.sign_out_panes();
                }
                if to == View::Login {
                    self.login.reset(&self.session);
                }
                Cmd::none()
            }
            Transition::TabChanged { from, to } => {
                info!(from = from.id(), to = to.id(), "tab changed");
                self.leave_tab(from);
                self.enter_tab(to)
            }
            Transition::FormUpdated => {
                self.login.sync(&self.session);
                Cmd::none()
            }
            Transition::Unchanged => Cmd::none(),
        }
    }

    fn enter_tab(&mut self, tab: Tab) -> Cmd<AppMsg> {
        match tab {
            Tab::CheckIn => {
                self.checkin.mount();
                Cmd::none()
            }
            Tab::Predictions => self.predictions.activate(),
            _ => Cmd::none(),
        }
    }

    fn leave_tab(&mut self, tab: Tab) {
        if tab == Tab::CheckIn {
            self.checkin.unmount();
        }
    }

    /// Drop everything the signed-out user saw.
    fn sign_out_panes(&mut self) {
        self.checkin.unmount();
        self.checkin.clear_recorded();
        self.map = MapPane::new();
        self.citizen_home = CitizenHome::new();
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<AppMsg> {
        if !key.is_press() {
            return Cmd::none();
        }
        if key.ctrl() && matches!(key.code, KeyCode::Char('c' | 'q')) {
            return Cmd::quit();
        }
        match self.session.view() {
            View::Landing => self.landing.update(&key),
            View::Login => self.login.update(&key),
            View::App => self.handle_app_key(key),
        }
    }

    fn handle_app_key(&mut self, key: KeyEvent) -> Cmd<AppMsg> {
        let tabs = self.session.visible_tabs();
        let select = |tab: Tab| Cmd::msg(AppMsg::Session(SessionAction::SelectTab(tab)));

        if key.ctrl() {
            return match key.code {
                KeyCode::Char('l') => Cmd::msg(AppMsg::Session(SessionAction::Logout)),
                _ => Cmd::none(),
            };
        }

        let current = tabs.iter().position(|t| *t == self.session.active_tab());
        match key.code {
            KeyCode::Tab if !tabs.is_empty() => {
                let next = current.map_or(0, |i| (i + 1) % tabs.len());
                select(tabs[next])
            }
            KeyCode::BackTab if !tabs.is_empty() => {
                let prev = current.map_or(tabs.len() - 1, |i| (i + tabs.len() - 1) % tabs.len());
                select(tabs[prev])
            }
            KeyCode::Home => select(Tab::Dashboard),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                tabs.get(idx).map_or_else(Cmd::none, |tab| select(*tab))
            }
            _ => self.pane_update(&key),
        }
    }

    fn pane_update(&mut self, key: &KeyEvent) -> Cmd<AppMsg> {
        match self.session.active_tab() {
            Tab::Dashboard if self.is_citizen() => self.citizen_home.update(key),
            Tab::CheckIn => self.checkin.update(key),
            Tab::Map => self.map.update(key),
            Tab::Predictions => self.predictions.update(key),
            _ => Cmd::none(),
        }
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        let mut entries = match self.session.view() {
            View::Landing => self.landing.keybindings(),
            View::Login => self.login.keybindings(),
            View::App => {
                let mut entries = match self.session.active_tab() {
                    Tab::Dashboard if self.is_citizen() => self.citizen_home.keybindings(),
                    Tab::CheckIn => self.checkin.keybindings(),
                    Tab::Map => self.map.keybindings(),
                    _ => Vec::new(),
                };
                entries.push(HelpEntry::new("Tab", "Onglet suivant"));
                entries.push(HelpEntry::new("1-9", "Aller à"));
                entries.push(HelpEntry::new("Ctrl+L", "Déconnexion"));
                entries
            }
        };
        entries.push(HelpEntry::new("Ctrl+C", "Quitter"));
        entries
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn view_app(&self, frame: &mut Frame, area: Rect) {
        let Some(user) = self.session.current_user() else {
            return;
        };
        let tab = self.session.active_tab();
        let (sidebar, main) = area.split_left(theme::SIDEBAR_WIDTH.min(area.width / 3));
        chrome::render_sidebar(frame, sidebar, self.session.visible_tabs(), tab);

        let (header, content) = main.split_top(3);
        chrome::render_header(frame, Rect::new(header.x, header.y + 1, header.width, 2), user, tab);
        let content = Rect::new(
            content.x + theme::SM,
            content.y,
            content.width.saturating_sub(theme::SM * 2),
            content.height,
        );

        match tab {
            Tab::Dashboard if user.role == Role::Citizen => self.citizen_home.view(frame, content),
            Tab::Dashboard => dashboard::view_staff(frame, content),
            Tab::CheckIn => self.checkin.view(frame, content),
            Tab::History => history::view(frame, content, self.checkin.recorded()),
            Tab::Map => self.map.view(frame, content),
            Tab::Predictions => self.predictions.view(frame, content),
            Tab::CitizenReviews => reviews::view(frame, content),
            other => placeholder::view(frame, content, other),
        }
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        info!(exit_after = ?self.exit_after, "moraqaba started");
        Cmd::none()
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::Key(key) => self.handle_key(key),
            AppMsg::Paste(text) => {
                if self.session.view() == View::Login {
                    self.login.paste(&text);
                }
                Cmd::none()
            }
            AppMsg::Resize { width, height } => {
                debug!(width, height, "terminal resized");
                Cmd::none()
            }
            AppMsg::Session(action) => self.apply_session(action),
            AppMsg::CheckInTimer { timer, epoch } => {
                if let Some(CheckInOutcome::Completed { verified }) =
                    self.checkin.timer_fired(timer, epoch)
                {
                    debug!(verified, "check-in completion delivered");
                }
                Cmd::none()
            }
            AppMsg::PredictionReady {
                generation,
                prediction,
            } => {
                let origin = prediction.origin;
                let shown = self.on_tab(Tab::Predictions);
                if self.predictions.deliver(generation, prediction, shown) {
                    info!(generation, origin = origin.name(), "prediction shown");
                }
                Cmd::none()
            }
            AppMsg::Tick => {
                self.checkin.tick();
                self.predictions.tick();
                Cmd::none()
            }
            AppMsg::Quit => Cmd::quit(),
            AppMsg::Noop => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.buffer.fill(area, theme::base());
        let (body, status) = area.split_top(area.height.saturating_sub(1));

        let view_name = match self.session.view() {
            View::Landing => {
                self.landing.view(frame, body);
                self.landing.title()
            }
            View::Login => {
                self.login.view(frame, body);
                self.login.title()
            }
            View::App => {
                self.view_app(frame, body);
                self.session.active_tab().id()
            }
        };

        let bindings = self.keybindings();
        chrome::render_status_bar(
            &StatusBarState {
                view_name,
                bindings: &bindings,
            },
            frame,
            status,
        );
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<AppMsg>>> {
        let mut subs: Vec<Box<dyn Subscription<AppMsg>>> = Vec::new();
        let on_checkin = self.on_tab(Tab::CheckIn);
        if on_checkin {
            subs.extend(self.checkin.subscriptions());
        }
        let animating = (on_checkin && self.checkin.is_animating())
            || (self.on_tab(Tab::Predictions) && self.predictions.is_loading());
        if animating {
            subs.push(Box::new(Every::with_id(
                ANIMATION_SUB_ID,
                ANIMATION_INTERVAL,
                || AppMsg::Tick,
            )));
        }
        if let Some(delay) = self.exit_after {
            subs.push(Box::new(After::new(EXIT_SUB_ID, delay, || AppMsg::Quit)));
        }
        subs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moraqaba_core::{PredictionError, SimulatedCamera};

    struct Silent;

    impl PredictionSource for Silent {
        fn generate(&self, _prompt: &str) -> Result<String, PredictionError> {
            Err(PredictionError::MissingCredential)
        }
    }

    fn model() -> AppModel {
        AppModel::new(Box::new(SimulatedCamera::granting()), Arc::new(Silent))
    }

    fn run(model: &mut AppModel, msg: AppMsg) {
        let mut queue = vec![model.update(msg)];
        while let Some(cmd) = queue.pop() {
            match cmd {
                Cmd::Msg(m) => queue.push(model.update(m)),
                Cmd::Batch(cmds) => queue.extend(cmds),
                _ => {}
            }
        }
    }

    fn key(code: KeyCode) -> AppMsg {
        AppMsg::Key(KeyEvent::new(code))
    }

    fn type_text(model: &mut AppModel, text: &str) {
        for c in text.chars() {
            run(model, key(KeyCode::Char(c)));
        }
    }

    fn sign_in_doctor(model: &mut AppModel) {
        run(model, key(KeyCode::Char('p')));
        type_text(model, "AB123456");
        run(model, key(KeyCode::Tab));
        type_text(model, "pw");
        run(model, key(KeyCode::Enter));
    }

    #[test]
    fn events_map_to_messages() {
        assert!(matches!(AppMsg::from(Event::Tick), AppMsg::Tick));
        assert!(matches!(AppMsg::from(Event::Focus(true)), AppMsg::Noop));
        assert!(matches!(
            AppMsg::from(Event::Resize { width: 80, height: 24 }),
            AppMsg::Resize { width: 80, height: 24 }
        ));
    }

    #[test]
    fn keyboard_login_reaches_dashboard() {
        let mut m = model();
        sign_in_doctor(&mut m);
        assert_eq!(m.session().view(), View::App);
        assert_eq!(m.session().active_tab(), Tab::Dashboard);
        assert_eq!(m.session().current_user().map(|u| u.role), Some(Role::Doctor));
    }

    #[test]
    fn empty_submit_keeps_login_and_shows_error() {
        let mut m = model();
        run(&mut m, key(KeyCode::Char('c')));
        run(&mut m, key(KeyCode::Enter));
        assert_eq!(m.session().view(), View::Login);
        assert!(m.login().error().is_some());
    }

    #[test]
    fn digits_and_tab_cycle_role_tabs() {
        let mut m = model();
        sign_in_doctor(&mut m);
        run(&mut m, key(KeyCode::Char('2')));
        assert_eq!(m.session().active_tab(), Tab::CheckIn);
        assert!(m.checkin().is_open());
        run(&mut m, key(KeyCode::Tab));
        assert_eq!(m.session().active_tab(), Tab::History);
        assert_eq!(m.checkin().phase(), &moraqaba_core::CheckInPhase::Idle);
        run(&mut m, key(KeyCode::Tab));
        assert_eq!(m.session().active_tab(), Tab::Dashboard);
        run(&mut m, key(KeyCode::Char('9')));
        assert_eq!(m.session().active_tab(), Tab::Dashboard);
    }

    #[test]
    fn logout_returns_to_landing() {
        let mut m = model();
        sign_in_doctor(&mut m);
        run(
            &mut m,
            AppMsg::Key(KeyEvent::new(KeyCode::Char('l')).with_modifiers(moraqaba_runtime::Modifiers::CTRL)),
        );
        assert_eq!(m.session().view(), View::Landing);
        assert!(m.session().current_user().is_none());
    }

    #[test]
    fn ctrl_c_quits_from_any_view() {
        let mut m = model();
        let cmd = m.update(AppMsg::Key(
            KeyEvent::new(KeyCode::Char('c')).with_modifiers(moraqaba_runtime::Modifiers::CTRL),
        ));
        assert!(matches!(cmd, Cmd::Quit));
    }

    #[test]
    fn exit_after_declares_quit_timer() {
        let m = model().with_exit_after(500);
        let ids: Vec<SubId> = m.subscriptions().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![EXIT_SUB_ID]);
        assert!(model().with_exit_after(0).subscriptions().is_empty());
    }

    #[test]
    fn renders_each_view() {
        let mut m = model();
        let mut frame = Frame::new(120, 40);
        m.view(&mut frame);
        assert!(frame.buffer.contains_text("Accès Professionnel"));

        run(&mut m, key(KeyCode::Char('p')));
        let mut frame = Frame::new(120, 40);
        m.view(&mut frame);
        assert!(frame.buffer.contains_text("Espace Professionnel"));

        type_text(&mut m, "X1");
        run(&mut m, key(KeyCode::Tab));
        type_text(&mut m, "pw");
        run(&mut m, key(KeyCode::Enter));
        let mut frame = Frame::new(120, 40);
        m.view(&mut frame);
        assert!(frame.buffer.contains_text("Bonjour, Utilisateur Santé"));
        assert!(frame.buffer.contains_text("Check-in Face ID"));
        assert!(frame.buffer.contains_text("Ctrl+L"));
    }
}
