#![forbid(unsafe_code)]

//! Check-in pane.
//!
//! Hosts the [`CheckInSimulator`]: mounts the camera when the pane opens,
//! declares the pending scan/hold timer as a one-shot subscription and
//! releases the camera when the pane closes. Each mount bumps an epoch that
//! is baked into the timer id and message, so a timer from an earlier visit
//! can neither keep running nor be applied.

use chrono::Timelike;
use moraqaba_core::{
    CameraDevice, CheckInOutcome, CheckInPhase, CheckInSimulator, CheckInTime, CheckInTimer,
};
use moraqaba_runtime::{After, Cmd, Frame, KeyCode, KeyEvent, Rect, SubId, Subscription};
use tracing::{debug, info};

use super::{HelpEntry, Screen, print_centered, print_wrapped_centered};
use crate::app::AppMsg;
use crate::theme;

/// Source of the wall-clock time recorded on a successful check-in.
pub type Clock = fn() -> CheckInTime;

pub fn local_clock() -> CheckInTime {
    let now = chrono::Local::now();
    CheckInTime::at(
        u8::try_from(now.hour()).unwrap_or(0),
        u8::try_from(now.minute()).unwrap_or(0),
    )
}

const TIMER_ID_BASE: SubId = 0x4348_4B00_0000_0000;

/// Subscription id for `timer` in mount `epoch`.
pub fn timer_sub_id(epoch: u64, timer: CheckInTimer) -> SubId {
    let code = match timer {
        CheckInTimer::Scan => 1,
        CheckInTimer::Hold => 2,
    };
    TIMER_ID_BASE | ((epoch & 0xFFFF_FFFF) << 8) | code
}

pub const PERMISSION_PROMPT: &str =
    "Veuillez autoriser l'accès à la caméra pour effectuer la reconnaissance faciale.";
pub const SIMULATION_NOTICE: &str =
    "Simulation : aucune reconnaissance faciale n'est réellement effectuée.";

pub struct CheckInPane {
    sim: CheckInSimulator,
    camera: Box<dyn CameraDevice>,
    epoch: u64,
    open: bool,
    verified_at: Option<CheckInTime>,
    recorded: Vec<CheckInTime>,
    clock: Clock,
    frame_no: u64,
}

impl CheckInPane {
    pub fn new(camera: Box<dyn CameraDevice>) -> Self {
        Self {
            sim: CheckInSimulator::new(),
            camera,
            epoch: 0,
            open: false,
            verified_at: None,
            recorded: Vec::new(),
            clock: local_clock,
            frame_no: 0,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn phase(&self) -> &CheckInPhase {
        self.sim.phase()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Check-in times recorded during this session, oldest first.
    pub fn recorded(&self) -> &[CheckInTime] {
        &self.recorded
    }

    /// Forget the recorded check-ins, e.g. on logout.
    pub fn clear_recorded(&mut self) {
        self.recorded.clear();
    }

    /// Open the scanner and request the camera.
    pub fn mount(&mut self) {
        self.epoch += 1;
        self.open = true;
        self.verified_at = None;
        let phase = self.sim.mount(self.camera.as_mut());
        info!(epoch = self.epoch, phase = phase.name(), "check-in pane mounted");
    }

    /// Release the camera and forget any pending timer.
    pub fn unmount(&mut self) {
        if self.sim.has_stream() || self.sim.pending_timer().is_some() {
            debug!(epoch = self.epoch, phase = self.sim.phase().name(), "check-in pane torn down");
        }
        self.sim.unmount();
    }

    /// Apply an elapsed timer. Timers from another mount are dropped.
    pub fn timer_fired(&mut self, timer: CheckInTimer, epoch: u64) -> Option<CheckInOutcome> {
        if epoch != self.epoch || !self.open {
            debug!(epoch, current = self.epoch, ?timer, "check-in timer from a closed scanner");
            return None;
        }
        let outcome = self.sim.timer_fired(timer);
        if self.sim.phase() == &CheckInPhase::Success && self.verified_at.is_none() {
            self.verified_at = Some((self.clock)());
        }
        if let Some(CheckInOutcome::Completed { verified }) = outcome {
            let at = self.verified_at.unwrap_or_else(self.clock);
            info!(verified, at = %at, "check-in recorded");
            self.recorded.push(at);
            self.sim.unmount();
            self.open = false;
        }
        outcome
    }

    pub fn tick(&mut self) {
        self.frame_no = self.frame_no.wrapping_add(1);
    }

    /// Whether the scan overlay is animating.
    pub fn is_animating(&self) -> bool {
        self.open && self.sim.phase() == &CheckInPhase::Scanning
    }

    pub fn subscriptions(&self) -> Vec<Box<dyn Subscription<AppMsg>>> {
        let Some(timer) = self.sim.pending_timer() else {
            return Vec::new();
        };
        let epoch = self.epoch;
        vec![Box::new(After::new(
            timer_sub_id(epoch, timer),
            timer.duration(),
            move || AppMsg::CheckInTimer { timer, epoch },
        ))]
    }

    fn view_preview(&self, frame: &mut Frame, area: Rect) {
        match self.sim.phase() {
            CheckInPhase::Idle => {
                frame.draw_box(area, theme::border());
                let mid = area.row(area.height / 2);
                print_centered(frame, mid, "Initialisation de la caméra...", theme::muted());
            }
            CheckInPhase::NoCamera(err) => {
                frame.draw_box(area, theme::border());
                let inner = area.inset(2);
                print_centered(frame, inner.row((inner.height / 2).saturating_sub(2)), "⚠", theme::warning());
                let text = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 3);
                let rows = print_wrapped_centered(frame, text, PERMISSION_PROMPT, theme::muted());
                let detail = inner.row(inner.height / 2 + rows + 1);
                print_centered(frame, detail, &err.to_string(), theme::faint());
            }
            CheckInPhase::Ready => {
                frame.buffer.fill(area, theme::dark_panel());
                draw_guides(frame, area);
                let mid = area.row(area.height / 2);
                print_centered(frame, mid, "● Caméra active", theme::dark_panel());
            }
            CheckInPhase::Scanning => {
                frame.buffer.fill(area, theme::dark_panel());
                draw_guides(frame, area);
                let inner = area.inset(1);
                let span = u64::from(inner.height.saturating_sub(2).max(1));
                // Sweep down then back up.
                let step = self.frame_no % (span * 2);
                let dy = if step < span { step } else { span * 2 - step - 1 };
                let line = inner.row(dy as u16);
                frame.print(line, &"━".repeat(line.width as usize), theme::scan_overlay());
                let label = inner.row(inner.height.saturating_sub(1));
                print_centered(frame, label, "Analyse Biométrique en cours...", theme::scan_overlay());
            }
            CheckInPhase::Success | CheckInPhase::Completed => {
                frame.buffer.fill(area, theme::success_overlay());
                let mid = area.height / 2;
                print_centered(frame, area.row(mid.saturating_sub(2)), "✔", theme::success_overlay());
                print_centered(frame, area.row(mid), "Identité Vérifiée", theme::success_overlay());
                if let Some(at) = self.verified_at {
                    let line = format!("Check-in enregistré à {at}");
                    print_centered(frame, area.row(mid + 1), &line, theme::success_overlay());
                }
            }
        }
    }
}

fn draw_guides(frame: &mut Frame, area: Rect) {
    if area.width < 6 || area.height < 4 {
        return;
    }
    let style = theme::faint();
    let (l, r) = (area.x + 1, area.right() - 3);
    let (t, b) = (area.y + 1, area.bottom() - 2);
    frame.print(Rect::new(l, t, 2, 1), "┏━", style);
    frame.print(Rect::new(r, t, 2, 1), "━┓", style);
    frame.print(Rect::new(l, b, 2, 1), "┗━", style);
    frame.print(Rect::new(r, b, 2, 1), "━┛", style);
}

impl Screen for CheckInPane {
    fn update(&mut self, key: &KeyEvent) -> Cmd<AppMsg> {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
            if self.open {
                self.sim.start_scan();
            } else {
                self.mount();
            }
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut y = 1;
        print_centered(frame, area.row(y), "Check-in Biométrique", theme::title());
        y += 1;
        let blurb = Rect::new(area.x, area.y + y, area.width, 2);
        y += print_wrapped_centered(
            frame,
            blurb,
            "La reconnaissance faciale permet de sécuriser votre présence et d'éviter les fraudes.",
            theme::muted(),
        ) + 1;

        let w = area.width.min(48);
        let x = area.x + (area.width - w) / 2;

        if !self.open {
            if let Some(last) = self.recorded.last() {
                let line = format!("✔ Check-in enregistré à {last}");
                print_centered(frame, area.row(y + 2), &line, theme::success());
            }
            print_centered(
                frame,
                area.row(y + 4),
                "Entrée : nouveau check-in",
                theme::accent(),
            );
            return;
        }

        let preview = Rect::new(x, area.y + y, w, 14u16.min(area.height.saturating_sub(y + 4)));
        self.view_preview(frame, preview);
        y += preview.height + 1;

        match self.sim.phase() {
            CheckInPhase::Ready => {
                let button = Rect::new(x + (w.saturating_sub(26)) / 2, area.y + y, 26u16.min(w), 1);
                frame.buffer.fill(button, theme::button());
                print_centered(frame, button, "Démarrer le Check-in", theme::button());
            }
            CheckInPhase::Scanning => {
                const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
                let glyph = SPINNER[(self.frame_no % 4) as usize];
                let line = format!("{glyph} Traitement IA...");
                print_centered(frame, area.row(y), &line, theme::muted());
            }
            _ => {}
        }
        print_centered(frame, area.row(y + 2), SIMULATION_NOTICE, theme::faint());
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        match (self.open, self.sim.phase()) {
            (true, CheckInPhase::Ready) => vec![HelpEntry::new("Entrée", "Démarrer le Check-in")],
            (false, _) => vec![HelpEntry::new("Entrée", "Nouveau check-in")],
            _ => vec![],
        }
    }

    fn title(&self) -> &'static str {
        "checkin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moraqaba_core::SimulatedCamera;

    fn nine_fifteen() -> CheckInTime {
        CheckInTime::at(9, 15)
    }

    fn pane(camera: &SimulatedCamera) -> CheckInPane {
        CheckInPane::new(Box::new(camera.clone())).with_clock(nine_fifteen)
    }

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter)
    }

    #[test]
    fn full_visit_records_once_and_releases_camera() {
        let camera = SimulatedCamera::granting();
        let mut pane = pane(&camera);
        pane.mount();
        assert_eq!(camera.live_tracks(), 1);
        pane.update(&enter());
        assert_eq!(pane.phase(), &CheckInPhase::Scanning);
        let epoch = pane.epoch();
        assert_eq!(pane.timer_fired(CheckInTimer::Scan, epoch), None);
        assert_eq!(
            pane.timer_fired(CheckInTimer::Hold, epoch),
            Some(CheckInOutcome::Completed { verified: true })
        );
        assert_eq!(pane.timer_fired(CheckInTimer::Hold, epoch), None);
        assert_eq!(pane.recorded(), &[CheckInTime::at(9, 15)]);
        assert!(!pane.is_open());
        assert_eq!(camera.live_tracks(), 0);
    }

    #[test]
    fn timers_from_previous_mount_are_ignored() {
        let camera = SimulatedCamera::granting();
        let mut pane = pane(&camera);
        pane.mount();
        pane.update(&enter());
        let old = pane.epoch();
        pane.unmount();
        pane.mount();
        pane.update(&enter());
        assert_eq!(pane.timer_fired(CheckInTimer::Scan, old), None);
        assert_eq!(pane.phase(), &CheckInPhase::Scanning);
        assert_eq!(camera.acquisitions(), 2);
        assert_eq!(camera.live_tracks(), 1);
    }

    #[test]
    fn subscription_follows_pending_timer() {
        let camera = SimulatedCamera::granting();
        let mut pane = pane(&camera);
        pane.mount();
        assert!(pane.subscriptions().is_empty());
        pane.update(&enter());
        let subs = pane.subscriptions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id(), timer_sub_id(pane.epoch(), CheckInTimer::Scan));
        pane.timer_fired(CheckInTimer::Scan, pane.epoch());
        assert_eq!(
            pane.subscriptions()[0].id(),
            timer_sub_id(pane.epoch(), CheckInTimer::Hold)
        );
        pane.unmount();
        assert!(pane.subscriptions().is_empty());
    }

    #[test]
    fn timer_ids_are_distinct_per_epoch_and_timer() {
        let a = timer_sub_id(1, CheckInTimer::Scan);
        assert_ne!(a, timer_sub_id(1, CheckInTimer::Hold));
        assert_ne!(a, timer_sub_id(2, CheckInTimer::Scan));
    }

    #[test]
    fn denied_camera_shows_prompt_and_ignores_start() {
        let camera = SimulatedCamera::denying();
        let mut pane = pane(&camera);
        pane.mount();
        pane.update(&enter());
        assert!(matches!(pane.phase(), CheckInPhase::NoCamera(_)));
        assert!(pane.subscriptions().is_empty());
        let mut frame = Frame::new(90, 30);
        let area = frame.area();
        pane.view(&mut frame, area);
        let text = frame.buffer.to_text();
        assert!(text.contains("Veuillez autoriser"));
        assert!(!text.contains("Démarrer le Check-in"));
    }

    #[test]
    fn overlays_render_per_phase() {
        let camera = SimulatedCamera::granting();
        let mut pane = pane(&camera);
        pane.mount();
        let mut frame = Frame::new(90, 30);
        let area = frame.area();
        pane.view(&mut frame, area);
        assert!(frame.buffer.contains_text("Démarrer le Check-in"));
        assert!(frame.buffer.contains_text("Simulation"));

        pane.update(&enter());
        let mut frame = Frame::new(90, 30);
        pane.view(&mut frame, area);
        assert!(frame.buffer.contains_text("Analyse Biométrique en cours..."));
        assert!(frame.buffer.contains_text("Traitement IA..."));

        pane.timer_fired(CheckInTimer::Scan, pane.epoch());
        let mut frame = Frame::new(90, 30);
        pane.view(&mut frame, area);
        assert!(frame.buffer.contains_text("Identité Vérifiée"));
        assert!(frame.buffer.contains_text("Check-in enregistré à 09:15"));
    }

    #[test]
    fn enter_after_completion_reopens_scanner() {
        let camera = SimulatedCamera::granting();
        let mut pane = pane(&camera);
        pane.mount();
        pane.update(&enter());
        pane.timer_fired(CheckInTimer::Scan, pane.epoch());
        pane.timer_fired(CheckInTimer::Hold, pane.epoch());
        pane.update(&enter());
        assert!(pane.is_open());
        assert_eq!(pane.phase(), &CheckInPhase::Ready);
        assert_eq!(pane.epoch(), 2);
    }
}
