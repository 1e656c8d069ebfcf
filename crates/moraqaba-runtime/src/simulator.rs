#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a terminal. Background tasks
//! run synchronously, and subscriptions are scheduled on a virtual clock that
//! only moves when the test calls [`ProgramSimulator::advance`]. Subscriptions
//! are reconciled after every update exactly as the real runtime does, so a
//! timer the model stops declaring never fires.
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(AppModel::default());
//! sim.init();
//! sim.send(Msg::StartScan);
//! sim.advance(Duration::from_millis(4500));
//! let buf = sim.capture_frame(100, 30);
//! assert!(buf.contains_text("Identité Vérifiée"));
//! ```

use std::time::Duration;

use crate::event::Event;
use crate::frame::{Buffer, Frame};
use crate::program::{Cmd, Model};
use crate::subscription::{SubId, Subscription, Timing};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Log(String),
    /// Background task executed synchronously, with its name if any.
    Task(Option<String>),
    /// A subscription fired at this virtual time.
    Fired { id: SubId, at: Duration },
}

struct VirtualTimer<M: Send + 'static> {
    sub: Box<dyn Subscription<M>>,
    due: Duration,
    spent: bool,
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
    logs: Vec<String>,
    now: Duration,
    timers: Vec<VirtualTimer<M::Message>>,
}

impl<M: Model> ProgramSimulator<M> {
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            logs: Vec::new(),
            now: Duration::ZERO,
            timers: Vec::new(),
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.reconcile();
    }

    /// Convert each event to a message and dispatch it.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            self.dispatch(M::Message::from(event.clone()));
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a specific message to the model.
    pub fn send(&mut self, msg: M::Message) {
        if self.running {
            self.dispatch(msg);
        }
    }

    /// Move the virtual clock forward, firing every timer that falls due in
    /// order of due time.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        while self.running {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.spent && t.due <= target)
                .min_by_key(|(i, t)| (t.due, *i))
                .map(|(i, _)| i);
            let Some(index) = next else { break };
            let timer = &mut self.timers[index];
            self.now = timer.due;
            let id = timer.sub.id();
            let msg = timer.sub.fire();
            match timer.sub.timing() {
                Timing::Once(_) => timer.spent = true,
                Timing::Every(interval) => timer.due += interval.max(Duration::from_millis(1)),
            }
            self.command_log.push(CmdRecord::Fired { id, at: self.now });
            self.dispatch(msg);
        }
        self.now = target;
    }

    /// Virtual time elapsed since the simulator was created.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Ids of the subscriptions currently declared, in declaration order.
    pub fn active_subscriptions(&self) -> Vec<SubId> {
        self.timers.iter().map(|t| t.sub.id()).collect()
    }

    /// Render at the given size and keep the buffer.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame.buffer);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Log lines emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Names of every task executed so far, in order.
    pub fn task_names(&self) -> Vec<Option<String>> {
        self.command_log
            .iter()
            .filter_map(|r| match r {
                CmdRecord::Task(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn dispatch(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
        self.reconcile();
    }

    /// Mirror of the runtime's reconcile: keep declared ids, drop the rest,
    /// schedule new ones relative to the current virtual time.
    fn reconcile(&mut self) {
        let declared = self.model.subscriptions();
        let ids: Vec<SubId> = declared.iter().map(|s| s.id()).collect();
        self.timers.retain(|t| ids.contains(&t.sub.id()));
        for sub in declared {
            let id = sub.id();
            if self.timers.iter().any(|t| t.sub.id() == id) {
                continue;
            }
            let delay = match sub.timing() {
                Timing::Once(d) | Timing::Every(d) => d,
            };
            self.timers.push(VirtualTimer {
                due: self.now + delay,
                sub,
                spent: false,
            });
        }
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name));
                let msg = f();
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, KeyEvent};
    use crate::frame::Style;
    use crate::subscription::{After, Every};

    struct Lamp {
        on: bool,
        armed: bool,
        blinks: u32,
        blinking: bool,
        generation: u64,
    }

    #[derive(Debug)]
    enum LampMsg {
        Arm,
        Disarm,
        TurnOn,
        Blink,
        ToggleBlink,
        Fetch,
        Fetched(&'static str),
        Quit,
    }

    impl From<Event> for LampMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) if k.is_char('a') => LampMsg::Arm,
                Event::Key(k) if k.is_char('d') => LampMsg::Disarm,
                _ => LampMsg::Quit,
            }
        }
    }

    impl Model for Lamp {
        type Message = LampMsg;

        fn update(&mut self, msg: LampMsg) -> Cmd<LampMsg> {
            match msg {
                LampMsg::Arm => {
                    self.armed = true;
                    self.generation += 1;
                }
                LampMsg::Disarm => self.armed = false,
                LampMsg::TurnOn => {
                    self.on = true;
                    self.armed = false;
                    return Cmd::log("on");
                }
                LampMsg::Blink => self.blinks += 1,
                LampMsg::ToggleBlink => self.blinking = !self.blinking,
                LampMsg::Fetch => return Cmd::task_named("fetch", || LampMsg::Fetched("ok")),
                LampMsg::Fetched(s) => return Cmd::log(s),
                LampMsg::Quit => return Cmd::quit(),
            }
            Cmd::none()
        }

        fn view(&self, frame: &mut Frame) {
            let text = if self.on { "ON" } else { "OFF" };
            frame.print(frame.area(), text, Style::new());
        }

        fn subscriptions(&self) -> Vec<Box<dyn Subscription<LampMsg>>> {
            let mut subs: Vec<Box<dyn Subscription<LampMsg>>> = Vec::new();
            if self.armed {
                subs.push(Box::new(After::new(
                    100 + self.generation,
                    Duration::from_millis(300),
                    || LampMsg::TurnOn,
                )));
            }
            if self.blinking {
                subs.push(Box::new(Every::new(Duration::from_millis(100), || {
                    LampMsg::Blink
                })));
            }
            subs
        }
    }

    fn lamp() -> ProgramSimulator<Lamp> {
        let mut sim = ProgramSimulator::new(Lamp {
            on: false,
            armed: false,
            blinks: 0,
            blinking: false,
            generation: 0,
        });
        sim.init();
        sim
    }

    #[test]
    fn one_shot_fires_at_due_time() {
        let mut sim = lamp();
        sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('a'))));
        sim.advance(Duration::from_millis(299));
        assert!(!sim.model().on);
        sim.advance(Duration::from_millis(1));
        assert!(sim.model().on);
        assert_eq!(sim.logs(), ["on"]);
        assert!(sim.command_log().contains(&CmdRecord::Fired {
            id: 101,
            at: Duration::from_millis(300)
        }));
    }

    #[test]
    fn one_shot_fires_once() {
        let mut sim = lamp();
        sim.send(LampMsg::Arm);
        sim.advance(Duration::from_secs(10));
        assert_eq!(sim.logs().len(), 1);
        assert!(sim.active_subscriptions().is_empty());
    }

    #[test]
    fn undeclared_timer_is_cancelled() {
        let mut sim = lamp();
        sim.send(LampMsg::Arm);
        sim.advance(Duration::from_millis(200));
        sim.send(LampMsg::Disarm);
        sim.advance(Duration::from_secs(1));
        assert!(!sim.model().on);
        assert_eq!(sim.now(), Duration::from_millis(1200));
    }

    #[test]
    fn interval_fires_repeatedly() {
        let mut sim = lamp();
        sim.send(LampMsg::ToggleBlink);
        sim.advance(Duration::from_millis(350));
        assert_eq!(sim.model().blinks, 3);
        sim.send(LampMsg::ToggleBlink);
        sim.advance(Duration::from_secs(1));
        assert_eq!(sim.model().blinks, 3);
    }

    #[test]
    fn tasks_run_synchronously() {
        let mut sim = lamp();
        sim.send(LampMsg::Fetch);
        assert_eq!(sim.logs(), ["ok"]);
        assert_eq!(sim.task_names(), vec![Some("fetch".to_string())]);
    }

    #[test]
    fn quit_stops_processing() {
        let mut sim = lamp();
        sim.inject_events(&[
            Event::Key(KeyEvent::new(KeyCode::Escape)),
            Event::Key(KeyEvent::new(KeyCode::Char('a'))),
        ]);
        assert!(!sim.is_running());
        assert!(!sim.model().armed);
    }

    #[test]
    fn capture_frame_renders_view() {
        let mut sim = lamp();
        assert_eq!(sim.capture_frame(5, 1).row_text(0), "OFF");
        sim.send(LampMsg::TurnOn);
        assert_eq!(sim.capture_frame(5, 1).row_text(0), "ON");
        assert_eq!(sim.frames().len(), 2);
    }
}
