//! Event loop for the seating editor.
//!
//! [`ChartRuntime`] owns the [`SeatingState`], turns terminal events into
//! reducer actions, logs every transition, and redraws only the panels whose
//! content changed. Plugins observe events and transitions and may queue
//! actions of their own.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event as CrosstermEvent, KeyEvent, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use serde_json::json;

use crate::logging::{RUNTIME_TARGET, STATE_TARGET, event_with_fields, json_kv};
use crate::registry::{Panel, PanelRegistry};
use crate::render::{AnsiRenderer, ChartGeometry, HINTS, Highlights, render_chart, status_line};
use crate::state::{Action, Outcome, SeatingState};
use crate::{LogLevel, Logger, Rect, Result, RuntimeMetrics, ScreenLayout, Size};

pub mod controls;
pub mod diagnostics;
pub mod driver;

use controls::{Command, Controls};

pub const METRICS_TARGET: &str = "choir::runtime.metrics";

/// Configuration knobs for the editor loop.
#[derive(Clone)]
pub struct EditorConfig {
    /// Optional structured logger used by the runtime.
    pub logger: Option<Logger>,
    /// Metrics accumulator shared with diagnostics plugins.
    pub metrics: Option<Arc<Mutex<RuntimeMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
    /// Paint seats with part colours; off draws bracketed text.
    pub colour: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: METRICS_TARGET.to_string(),
            colour: true,
        }
    }
}

impl EditorConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(RuntimeMetrics::new())));
        }
    }

    /// Drop the collector and stop bootstrap from creating a new one.
    pub fn disable_metrics(&mut self) {
        self.metrics = None;
        self.metrics_interval = Duration::ZERO;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<RuntimeMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Events delivered to plugins and handled by the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    FocusGained,
    FocusLost,
    Resize(Size),
}

impl RuntimeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeEvent::Key(_) => "key",
            RuntimeEvent::Mouse(_) => "mouse",
            RuntimeEvent::Paste(_) => "paste",
            RuntimeEvent::FocusGained => "focus_gained",
            RuntimeEvent::FocusLost => "focus_lost",
            RuntimeEvent::Resize(_) => "resize",
        }
    }
}

/// Control the propagation of an event across plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    Consumed,
}

/// Read access to the editor plus a queue of requests applied once the
/// plugin hook returns.
pub struct RuntimeContext<'a> {
    state: &'a SeatingState,
    rects: &'a HashMap<Panel, Rect>,
    actions: Vec<Action>,
    status: Option<String>,
    redraw_requested: bool,
    exit_requested: bool,
}

impl<'a> RuntimeContext<'a> {
    fn new(state: &'a SeatingState, rects: &'a HashMap<Panel, Rect>) -> Self {
        Self {
            state,
            rects,
            actions: Vec::new(),
            status: None,
            redraw_requested: false,
            exit_requested: false,
        }
    }

    pub fn state(&self) -> &SeatingState {
        self.state
    }

    pub fn rect(&self, panel: Panel) -> Option<&Rect> {
        self.rects.get(&panel)
    }

    /// Queue an action for the reducer.
    pub fn dispatch(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Replace the status line text.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.redraw_requested = true;
    }

    pub fn request_render(&mut self) {
        self.redraw_requested = true;
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn into_outcome(self) -> ContextOutcome {
        ContextOutcome {
            actions: self.actions,
            status: self.status,
            redraw_requested: self.redraw_requested,
            exit_requested: self.exit_requested,
        }
    }
}

struct ContextOutcome {
    actions: Vec<Action>,
    status: Option<String>,
    redraw_requested: bool,
    exit_requested: bool,
}

/// Behaviour injection point for the editor.
pub trait ChartPlugin: Send {
    fn name(&self) -> &str {
        "chart_plugin"
    }

    fn init(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_event(
        &mut self,
        _ctx: &mut RuntimeContext<'_>,
        _event: &RuntimeEvent,
    ) -> Result<EventFlow> {
        Ok(EventFlow::Continue)
    }

    /// Called after every reducer step, including rejected ones.
    fn on_transition(&mut self, _action: &Action, _outcome: &Outcome, _state: &SeatingState) {}

    fn before_render(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        Ok(())
    }
}

pub struct ChartRuntime {
    layout: ScreenLayout,
    rects: HashMap<Panel, Rect>,
    registry: PanelRegistry,
    renderer: AnsiRenderer,
    state: SeatingState,
    controls: Controls,
    /// First visible chart (row, index); clamped whenever geometry is built.
    scroll: (usize, usize),
    status: String,
    plugins: Vec<Box<dyn ChartPlugin>>,
    config: EditorConfig,
    should_exit: bool,
    redraw_requested: bool,
    start_instant: Option<Instant>,
}

impl ChartRuntime {
    pub fn new(state: SeatingState, initial_size: Size) -> Self {
        let layout = ScreenLayout::editor();
        let rects = layout.solve(initial_size);
        let mut registry = PanelRegistry::new();
        registry.sync_layout(&rects);
        let status = format!("Seated {} members", state.grid().seated());

        Self {
            layout,
            rects,
            registry,
            renderer: AnsiRenderer::new(),
            state,
            controls: Controls::new(),
            scroll: (0, 0),
            status,
            plugins: Vec::new(),
            config: EditorConfig::default(),
            should_exit: false,
            redraw_requested: true,
            start_instant: None,
        }
    }

    pub fn with_layout(mut self, layout: ScreenLayout, size: Size) -> Self {
        self.layout = layout;
        self.resize(size);
        self
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn state(&self) -> &SeatingState {
        &self.state
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn rect_of(&self, panel: Panel) -> Option<Rect> {
        self.rects.get(&panel).copied()
    }

    /// Where the chart's seats sit on screen right now.
    pub fn chart_geometry(&self) -> ChartGeometry {
        let area = self.rect_of(Panel::Chart).unwrap_or_default();
        let (first_row, first_index) = self.scroll;
        ChartGeometry::new(area, self.state.grid()).with_scroll(first_row, first_index)
    }

    pub fn register_plugin<P>(&mut self, plugin: P)
    where
        P: ChartPlugin + 'static,
    {
        self.plugins.push(Box::new(plugin));
    }

    /// Re-solve the layout for a new terminal size.
    pub fn resize(&mut self, size: Size) {
        self.rects = self.layout.solve(size);
        self.registry.sync_layout(&self.rects);
        self.scroll = self.chart_geometry().scroll();
        self.redraw_requested = true;
        self.log_runtime_event(
            LogLevel::Info,
            "resized",
            [
                json_kv("width", json!(size.width)),
                json_kv("height", json!(size.height)),
            ],
        );
    }

    /// Block on terminal events until the user quits. Nothing happens
    /// between events, so the loop never polls.
    pub fn run(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap(stdout)?;
        while !self.should_exit {
            let event = Self::map_event(event::read()?);
            self.step(stdout, event)?;
        }
        self.finalize();
        Ok(())
    }

    /// Drive the loop from a fixed event list, for tests and demos.
    pub fn run_scripted<I>(&mut self, stdout: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = RuntimeEvent>,
    {
        self.bootstrap(stdout)?;
        for event in events {
            if self.should_exit {
                break;
            }
            self.step(stdout, event)?;
        }
        self.finalize();
        Ok(())
    }

    fn step(&mut self, stdout: &mut impl Write, event: RuntimeEvent) -> Result<()> {
        if let RuntimeEvent::Resize(size) = event {
            self.resize(size);
        }
        self.dispatch_event(event)?;
        self.render_if_needed(stdout)
    }

    fn map_event(event: CrosstermEvent) -> RuntimeEvent {
        match event {
            CrosstermEvent::Key(key) => RuntimeEvent::Key(key),
            CrosstermEvent::Mouse(mouse) => RuntimeEvent::Mouse(mouse),
            CrosstermEvent::Paste(data) => RuntimeEvent::Paste(data),
            CrosstermEvent::FocusGained => RuntimeEvent::FocusGained,
            CrosstermEvent::FocusLost => RuntimeEvent::FocusLost,
            CrosstermEvent::Resize(width, height) => RuntimeEvent::Resize(Size::new(width, height)),
        }
    }

    fn dispatch_event(&mut self, event: RuntimeEvent) -> Result<()> {
        let mut consumed = false;
        for idx in 0..self.plugins.len() {
            let (flow, outcome) = {
                let plugin = &mut self.plugins[idx];
                let mut ctx = RuntimeContext::new(&self.state, &self.rects);
                let flow = plugin.on_event(&mut ctx, &event)?;
                (flow, ctx.into_outcome())
            };
            self.apply_outcome(outcome);
            if flow == EventFlow::Consumed {
                consumed = true;
                break;
            }
        }

        if !consumed {
            let command = match &event {
                RuntimeEvent::Key(key) => self.controls.handle_key(key, &self.state),
                RuntimeEvent::Mouse(mouse) => self.handle_mouse(mouse),
                RuntimeEvent::Paste(text) => self.controls.handle_paste(text),
                RuntimeEvent::Resize(_) => Command::Redraw,
                RuntimeEvent::FocusGained | RuntimeEvent::FocusLost => Command::Nothing,
            };
            self.execute(command);
            if let RuntimeEvent::Key(_) = event {
                self.follow_cursor();
            }
        }

        self.with_metrics(|metrics| metrics.record_event());
        self.log_runtime_event(
            LogLevel::Debug,
            "event_dispatched",
            [
                json_kv("event", json!(event.kind())),
                json_kv("consumed", json!(consumed)),
            ],
        );
        Ok(())
    }

    /// Press picks a seat up, release over a seat drops it there, release
    /// anywhere else abandons the drag. The wheel scrolls the chart by rows,
    /// or by seats with Shift held.
    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Command {
        let geometry = self.chart_geometry();
        let hit = geometry.hit_test(mouse.column, mouse.row);
        let step = match mouse.kind {
            MouseEventKind::ScrollDown => 1,
            MouseEventKind::ScrollUp => -1,
            _ => 0,
        };
        if step != 0 {
            let sideways = mouse.modifiers.contains(KeyModifiers::SHIFT);
            let scrolled = if sideways {
                geometry.scrolled_by(0, step)
            } else {
                geometry.scrolled_by(step, 0)
            };
            if scrolled.scroll() == geometry.scroll() {
                return Command::Nothing;
            }
            self.scroll = scrolled.scroll();
            return Command::Redraw;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Some(coord) => Command::Dispatch(Action::BeginDrag(coord)),
                None => Command::Nothing,
            },
            MouseEventKind::Up(MouseButton::Left) => match (self.state.drag(), hit) {
                (Some(session), Some(target)) => Command::Dispatch(Action::CompleteDrag {
                    source: session.source,
                    target,
                }),
                (Some(_), None) => Command::Dispatch(Action::CancelDrag),
                (None, _) => Command::Nothing,
            },
            _ => Command::Nothing,
        }
    }

    /// Scroll just far enough to keep the keyboard cursor on screen.
    fn follow_cursor(&mut self) {
        if let Some(cursor) = self.controls.visible_cursor() {
            let scroll = self.chart_geometry().follow(cursor).scroll();
            if scroll != self.scroll {
                self.scroll = scroll;
                self.redraw_requested = true;
            }
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Nothing => {}
            Command::Redraw => self.redraw_requested = true,
            Command::Dispatch(action) => self.dispatch_action(action),
            Command::Exit => {
                self.should_exit = true;
                self.log_runtime_event(LogLevel::Info, "exit_requested", std::iter::empty());
            }
        }
    }

    /// Run one reducer step and fan the result out to logs, metrics,
    /// plugins and the status line.
    pub fn dispatch_action(&mut self, action: Action) {
        let mut fields = action.fields();
        let outcome = self.state.apply(action.clone());

        fields.push(json_kv("outcome", outcome.kind()));
        fields.push(json_kv("generation", self.state.generation()));
        let level = match &outcome {
            Outcome::Rejected(err) => {
                fields.push(json_kv("error", err.kind()));
                fields.push(json_kv("reason", err.to_string()));
                LogLevel::Warn
            }
            Outcome::Regenerated { seated, .. } => {
                fields.push(json_kv("seated", *seated));
                LogLevel::Info
            }
            Outcome::Swapped { .. } => LogLevel::Info,
            Outcome::DragStarted(_) | Outcome::DragCancelled | Outcome::Unchanged => {
                LogLevel::Debug
            }
        };
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, STATE_TARGET, "transition", fields));
        }

        self.with_metrics(|metrics| metrics.record_outcome(&outcome));
        for plugin in self.plugins.iter_mut() {
            plugin.on_transition(&action, &outcome, &self.state);
        }

        self.controls.sync(&self.state);
        self.status = outcome.describe();
        self.redraw_requested = true;
    }

    fn apply_outcome(&mut self, outcome: ContextOutcome) {
        let ContextOutcome {
            actions,
            status,
            redraw_requested,
            exit_requested,
        } = outcome;

        for action in actions {
            self.dispatch_action(action);
        }

        if let Some(status) = status {
            self.status = status;
        }

        if redraw_requested {
            self.redraw_requested = true;
        }

        if exit_requested {
            self.should_exit = true;
            self.log_runtime_event(LogLevel::Info, "exit_requested", std::iter::empty());
        }
    }

    fn render_if_needed(&mut self, stdout: &mut impl Write) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }
        self.redraw_requested = false;

        for idx in 0..self.plugins.len() {
            let outcome = {
                let plugin = &mut self.plugins[idx];
                let mut ctx = RuntimeContext::new(&self.state, &self.rects);
                plugin.before_render(&mut ctx)?;
                ctx.into_outcome()
            };
            self.apply_outcome(outcome);
        }

        self.compose_panels()?;

        let dirty = self.registry.take_dirty();
        if !dirty.is_empty() {
            self.renderer.render(stdout, &dirty)?;
            self.with_metrics(|metrics| metrics.record_render(dirty.len()));
            self.log_runtime_event(
                LogLevel::Debug,
                "render_completed",
                [json_kv("dirty_panels", json!(dirty.len()))],
            );
        }
        Ok(())
    }

    /// Rebuild every panel's content; the registry drops unchanged ones.
    fn compose_panels(&mut self) -> Result<()> {
        let colour = self.config.colour;
        let mut contents = Vec::with_capacity(Panel::ALL.len());

        if let Some(rect) = self.rects.get(&Panel::Controls) {
            contents.push((
                Panel::Controls,
                self.controls.render(&self.state, rect.width, colour),
            ));
        }
        let geometry = self.chart_geometry();
        if self.rects.contains_key(&Panel::Chart) {
            let highlights = Highlights {
                source: self.state.drag().map(|session| session.source),
                cursor: self.controls.visible_cursor(),
            };
            let chart = render_chart(self.state.grid(), &geometry, highlights, colour);
            contents.push((Panel::Chart, chart));
        }
        if self.rects.contains_key(&Panel::Status) {
            let status = status_line(&self.status, &self.state, geometry.offscreen());
            contents.push((Panel::Status, status));
        }
        if self.rects.contains_key(&Panel::Hints) {
            contents.push((Panel::Hints, HINTS.to_string()));
        }

        for (panel, content) in contents {
            self.registry.apply_content(panel, content)?;
        }
        Ok(())
    }

    fn bootstrap(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.should_exit = false;
        self.redraw_requested = true;
        self.ensure_metrics_initialized();
        self.start_instant = Some(Instant::now());
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_started",
            [
                json_kv("plugins", json!(self.plugins.len())),
                json_kv("panels", json!(self.rects.len())),
                json_kv("seated", json!(self.state.grid().seated())),
            ],
        );

        for idx in 0..self.plugins.len() {
            let outcome = {
                let plugin = &mut self.plugins[idx];
                let plugin_name = plugin.name().to_string();
                let mut ctx = RuntimeContext::new(&self.state, &self.rects);
                plugin.init(&mut ctx)?;
                self.log_runtime_event(
                    LogLevel::Debug,
                    "plugin_initialized",
                    [json_kv("plugin", json!(plugin_name))],
                );
                ctx.into_outcome()
            };
            self.apply_outcome(outcome);
        }

        self.render_if_needed(stdout)
    }

    fn finalize(&mut self) {
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_stopped",
            [
                json_kv("uptime_ms", json!(uptime_ms)),
                json_kv("generation", json!(self.state.generation())),
            ],
        );
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && self.config.metrics_interval > Duration::ZERO {
            self.config.enable_metrics();
        }
    }

    fn with_metrics(&self, record: impl FnOnce(&mut RuntimeMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, RUNTIME_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}
