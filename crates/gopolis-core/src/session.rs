//! Interactive session state driven by dispatcher messages.
//!
//! A [`Session`] is the dispatcher context of an interactive run. It owns
//! the [`Simulation`], keeps the UI state that does not depend on any
//! particular screen (click mode, console line, viewport) and hands a
//! [`Frame`] to a [`Renderer`] after every simulated day. Drawing is the
//! renderer's business.

use tracing::{debug, error, info};

use crate::driver::Simulation;
use crate::event::{Dispatcher, Message};
use crate::fixed::Ticks;
use crate::id::SubscriptionId;
use crate::input::{Key, MouseButton, MouseEvent, Size};
use crate::kind::EventKind;
use crate::query::CitySnapshot;
use crate::sim::DayReport;

/// What a left click would place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClickMode {
    #[default]
    Idle,
    Residential,
    Commercial,
    Industrial,
    Delete,
}

impl ClickMode {
    /// F1..=F5 select a mode; other keys do not.
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::F(1) => Some(Self::Idle),
            Key::F(2) => Some(Self::Residential),
            Key::F(3) => Some(Self::Commercial),
            Key::F(4) => Some(Self::Industrial),
            Key::F(5) => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle mode",
            Self::Residential => "residential mode",
            Self::Commercial => "commercial mode",
            Self::Industrial => "industrial mode",
            Self::Delete => "delete mode",
        }
    }
}

/// Everything a renderer gets after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Tick counter carried by the triggering message.
    pub tick: Ticks,
    pub report: DayReport,
    pub city: CitySnapshot,
    pub console: String,
    pub mode: ClickMode,
    /// Drawable area; the console row is already excluded.
    pub viewport: Size,
}

/// Consumer of frames. Terminal, window or log output.
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame) {}
}

impl<F: FnMut(&Frame)> Renderer for F {
    fn render(&mut self, frame: &Frame) {
        self(frame)
    }
}

/// Lets an event loop ask its context whether to keep going.
pub trait LoopControl {
    fn is_running(&self) -> bool;
}

pub struct Session<R = NullRenderer> {
    simulation: Simulation,
    renderer: R,
    running: bool,
    mode: ClickMode,
    console: String,
    viewport: Size,
    frames: u64,
    last_report: Option<DayReport>,
}

impl<R> std::fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("running", &self.running)
            .field("mode", &self.mode)
            .field("console", &self.console)
            .field("viewport", &self.viewport)
            .field("frames", &self.frames)
            .field("day", &self.simulation.day())
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> Session<R> {
    /// `screen` is the full terminal size, console row included.
    pub fn new(simulation: Simulation, renderer: R, screen: Size) -> Self {
        let mut session = Self {
            simulation,
            renderer,
            running: true,
            mode: ClickMode::Idle,
            console: "initialized".to_string(),
            viewport: Size::default(),
            frames: 0,
            last_report: None,
        };
        session.resize(screen);
        session
    }

    /// Register the session's handlers on `dispatcher`.
    pub fn install(dispatcher: &mut Dispatcher<Self>) -> Vec<SubscriptionId>
    where
        R: 'static,
    {
        vec![
            dispatcher.subscribe_reactive(EventKind::KEY, |s: &mut Self, m| s.on_key(m)),
            dispatcher.subscribe(EventKind::RESIZE, |s: &mut Self, m| s.on_resize(m)),
            dispatcher.subscribe(EventKind::MOUSE, |s: &mut Self, m| s.on_mouse(m)),
            dispatcher.subscribe(EventKind::TICK, |s: &mut Self, m| s.on_tick(m)),
            dispatcher.subscribe(EventKind::ERROR, |s: &mut Self, m| s.on_error(m)),
            dispatcher.subscribe(EventKind::QUIT, |s: &mut Self, _| s.on_quit()),
        ]
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn mode(&self) -> ClickMode {
        self.mode
    }

    pub fn console(&self) -> &str {
        &self.console
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Frames handed to the renderer so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_report(&self) -> Option<&DayReport> {
        self.last_report.as_ref()
    }

    /// Stop the session and give back the simulation and renderer.
    pub fn into_parts(self) -> (Simulation, R) {
        (self.simulation, self.renderer)
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn on_key(&mut self, message: &Message) -> Vec<Message> {
        if !self.running {
            return Vec::new();
        }
        let Some(key) = message.as_key() else {
            return Vec::new();
        };
        if key == Key::Esc {
            debug!("escape pressed");
            return vec![Message::quit()];
        }
        if let Some(mode) = ClickMode::from_key(key) {
            debug!(?mode, "click mode");
            self.mode = mode;
            self.console = mode.label().to_string();
        }
        Vec::new()
    }

    fn on_resize(&mut self, message: &Message) {
        if !self.running {
            return;
        }
        if let Some(size) = message.as_resize() {
            self.resize(size);
        }
    }

    fn on_mouse(&mut self, message: &Message) {
        if !self.running {
            return;
        }
        if let Some(MouseEvent {
            button: MouseButton::Left,
            x,
            y,
        }) = message.as_mouse()
        {
            self.click(x, y);
        }
    }

    fn on_tick(&mut self, message: &Message) {
        if !self.running {
            return;
        }
        let report = self.simulation.step_day();
        let frame = Frame {
            tick: message.as_tick().unwrap_or_default(),
            report,
            city: self.simulation.snapshot(),
            console: self.console.clone(),
            mode: self.mode,
            viewport: self.viewport,
        };
        self.renderer.render(&frame);
        self.frames += 1;
        self.last_report = Some(report);
    }

    fn on_error(&mut self, message: &Message) {
        if !self.running {
            return;
        }
        let detail = message.as_text().unwrap_or("unknown error");
        error!(detail, "input source failed");
        self.console = format!("error: {detail}");
        self.running = false;
    }

    fn on_quit(&mut self) {
        if self.running {
            info!(day = self.simulation.day(), "session stopped");
        }
        self.running = false;
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// The bottom row belongs to the console.
    fn resize(&mut self, screen: Size) {
        let viewport = Size::new(screen.width, screen.height.saturating_sub(1));
        if viewport != self.viewport {
            debug!(width = viewport.width, height = viewport.height, "viewport resized");
            self.viewport = viewport;
        }
    }

    fn click(&mut self, x: i32, y: i32) {
        self.console = format!("mouse at {x}:{y}");
        let inside = x >= 0
            && y >= 0
            && (x as u32) < self.viewport.width
            && (y as u32) < self.viewport.height;
        if !inside {
            self.console.push_str(" out of bounds");
        }
    }
}

impl<R> LoopControl for Session<R> {
    fn is_running(&self) -> bool {
        self.running
    }
}
