#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! A [`Model`] owns all application state and changes only in
//! [`Model::update`]. Side effects are returned as [`Cmd`] values and carried
//! out by the runtime; timers are declared through
//! [`Model::subscriptions`].
//!
//! ```ignore
//! struct Counter { count: i32 }
//!
//! enum Msg { Increment, Quit }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             _ => Msg::Increment,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         frame.print(frame.area(), &format!("{}", self.count), Style::new());
//!     }
//! }
//! ```

use std::io::{self, Stdout};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, info, info_span};

use crate::event::Event;
use crate::frame::Frame;
use crate::subscription::{Subscription, SubscriptionManager};
use crate::terminal_session::{SessionOptions, TerminalSession};
use crate::terminal_writer::{ScreenMode, TerminalWriter};

/// The Model trait defines application state and behavior.
pub trait Model: Sized {
    /// Messages drive every state change. Terminal events convert into them.
    type Message: From<Event> + Send + 'static;

    /// Startup commands, run once before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The core state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state.
    fn view(&self, frame: &mut Frame);

    /// Declare active subscriptions.
    ///
    /// Called after each `update()`. The runtime compares the returned set
    /// (by id) against what is running and starts or stops the difference.
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        vec![]
    }
}

/// Metadata for background tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSpec {
    /// Task name for logs and the simulator's command log.
    pub name: Option<String>,
}

impl TaskSpec {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Commands represent side effects to be executed by the runtime.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Quit the application.
    Quit,
    /// Execute commands in order, stopping early on quit.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Record a log line.
    Log(String),
    /// Run a blocking closure on a background thread; its return value is
    /// sent back to `update()`.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Batch commands, collapsing the empty and single cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Task(..) => "Task",
        }
    }

    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default().with_name(name), Box::new(f))
    }
}

/// Configuration for a [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    pub screen_mode: ScreenMode,
    /// How long to wait for input before servicing timers and tasks.
    pub poll_timeout: Duration,
    /// Deliver `Event::Tick` at this rate, if set.
    pub tick_rate: Option<Duration>,
    pub bracketed_paste: bool,
    pub focus_reporting: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            screen_mode: ScreenMode::AltScreen,
            poll_timeout: Duration::from_millis(50),
            tick_rate: None,
            bracketed_paste: true,
            focus_reporting: false,
        }
    }
}

impl ProgramConfig {
    pub fn fullscreen() -> Self {
        Self::default()
    }

    pub fn inline(ui_height: u16) -> Self {
        Self {
            screen_mode: ScreenMode::Inline { ui_height },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tick_rate(mut self, rate: Duration) -> Self {
        self.tick_rate = Some(rate);
        self
    }
}

/// The program runtime.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    writer: TerminalWriter<Stdout>,
    subscriptions: SubscriptionManager<M::Message>,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    task_handles: Vec<JoinHandle<()>>,
    config: ProgramConfig,
    running: bool,
    dirty: bool,
    width: u16,
    height: u16,
    last_tick: Instant,
}

impl<M: Model> Program<M> {
    /// Take over the terminal. It is restored when the program is dropped.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: matches!(config.screen_mode, ScreenMode::AltScreen),
            bracketed_paste: config.bracketed_paste,
            focus_events: config.focus_reporting,
        })?;
        let (width, term_height) = session.size()?;
        let mut writer = TerminalWriter::new(io::stdout(), config.screen_mode);
        writer.resize(term_height)?;
        let (task_sender, task_receiver) = mpsc::channel();
        Ok(Self {
            model,
            session,
            writer,
            subscriptions: SubscriptionManager::new(),
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
            height: config.screen_mode.ui_height(term_height),
            config,
            running: true,
            dirty: true,
            width,
            last_tick: Instant::now(),
        })
    }

    /// Run until the model returns [`Cmd::Quit`]. Returns the final model.
    pub fn run(mut self) -> io::Result<M> {
        let result = self.run_event_loop();
        self.subscriptions.stop_all();
        self.writer.finish()?;
        result?;
        let Program { model, session, .. } = self;
        drop(session);
        Ok(model)
    }

    fn run_event_loop(&mut self) -> io::Result<()> {
        let cmd = {
            let _span = info_span!("moraqaba.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        self.reconcile_subscriptions();
        self.render_frame()?;

        while self.running {
            if self.session.poll_event(self.effective_timeout())? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.process_subscription_messages()?;
            self.process_task_results()?;
            self.reap_finished_tasks();

            if let Some(rate) = self.config.tick_rate
                && self.last_tick.elapsed() >= rate
            {
                self.last_tick = Instant::now();
                self.dispatch(M::Message::from(Event::Tick), "tick")?;
                self.reconcile_subscriptions();
            }

            if self.dirty && self.running {
                self.render_frame()?;
            }
        }
        info!("program loop exited");
        Ok(())
    }

    fn effective_timeout(&self) -> Duration {
        match self.config.tick_rate {
            Some(rate) => rate
                .saturating_sub(self.last_tick.elapsed())
                .min(self.config.poll_timeout),
            None => self.config.poll_timeout,
        }
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            debug!(width, height, "resize");
            self.writer.resize(height)?;
            self.width = width;
            self.height = self.config.screen_mode.ui_height(height);
        }
        self.dispatch(M::Message::from(event), "event")?;
        self.reconcile_subscriptions();
        Ok(())
    }

    fn dispatch(&mut self, msg: M::Message, msg_type: &'static str) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!(
                "moraqaba.program.update",
                msg_type,
                duration_us = tracing::field::Empty,
                cmd_type = tracing::field::Empty
            )
            .entered();
            let start = Instant::now();
            let cmd = self.model.update(msg);
            let current = tracing::Span::current();
            current.record("duration_us", start.elapsed().as_micros() as u64);
            current.record("cmd_type", cmd.type_name());
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd)
    }

    fn reconcile_subscriptions(&mut self) {
        let _span = debug_span!(
            "moraqaba.program.subscriptions",
            active_count = tracing::field::Empty
        )
        .entered();
        self.subscriptions.reconcile(self.model.subscriptions());
        tracing::Span::current().record("active_count", self.subscriptions.active_count());
    }

    fn process_subscription_messages(&mut self) -> io::Result<()> {
        let messages = self.subscriptions.drain_messages();
        if messages.is_empty() {
            return Ok(());
        }
        for msg in messages {
            self.dispatch(msg, "subscription")?;
        }
        self.reconcile_subscriptions();
        Ok(())
    }

    fn process_task_results(&mut self) -> io::Result<()> {
        let mut any = false;
        while let Ok(msg) = self.task_receiver.try_recv() {
            any = true;
            self.dispatch(msg, "task")?;
        }
        if any {
            self.reconcile_subscriptions();
        }
        Ok(())
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.dispatch(m, "cmd")?,
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(text) => info!(target: "moraqaba::app_log", "{}", text.trim_end()),
            Cmd::Task(spec, f) => {
                debug!(task = spec.name.as_deref().unwrap_or("unnamed"), "spawning task");
                let sender = self.task_sender.clone();
                self.task_handles.push(std::thread::spawn(move || {
                    let _ = sender.send(f());
                }));
            }
        }
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if !handle.is_finished() {
                remaining.push(handle);
                continue;
            }
            if let Err(payload) = handle.join() {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_owned());
                tracing::error!("spawned task panicked: {msg}");
            }
        }
        self.task_handles = remaining;
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let _span = debug_span!("moraqaba.program.render", width = self.width, height = self.height)
            .entered();
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        let cursor = frame.cursor();
        self.writer.present(&frame.buffer, cursor)?;
        self.dirty = false;
        Ok(())
    }
}
