use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use crate::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::RuntimeMetrics;
use crate::state::{Action, Outcome, SeatingState};

use super::{ChartPlugin, EventFlow, METRICS_TARGET, RuntimeContext, RuntimeEvent};

pub const LIFECYCLE_TARGET: &str = "choir::runtime.lifecycle";

/// Logs terminal input and the drag lifecycle for debugging sessions.
pub struct LifecycleLoggerPlugin {
    logger: Logger,
    level: LogLevel,
    log_keys: bool,
    log_mouse: bool,
    log_paste: bool,
    log_drags: bool,
}

impl LifecycleLoggerPlugin {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: LogLevel::Debug,
            log_keys: true,
            log_mouse: false,
            log_paste: true,
            log_drags: true,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn log_keys(mut self, enabled: bool) -> Self {
        self.log_keys = enabled;
        self
    }

    pub fn log_mouse(mut self, enabled: bool) -> Self {
        self.log_mouse = enabled;
        self
    }

    pub fn log_paste(mut self, enabled: bool) -> Self {
        self.log_paste = enabled;
        self
    }

    pub fn log_drags(mut self, enabled: bool) -> Self {
        self.log_drags = enabled;
        self
    }

    fn emit(&self, message: &str, fields: impl IntoIterator<Item = (String, serde_json::Value)>) {
        let event = event_with_fields(self.level, LIFECYCLE_TARGET, message, fields);
        let _ = self.logger.log_event(event);
    }
}

impl ChartPlugin for LifecycleLoggerPlugin {
    fn name(&self) -> &str {
        "diagnostics.lifecycle_logger"
    }

    fn init(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let state = ctx.state();
        self.emit(
            "plugin_initialized",
            [
                json_kv("logger_level", json!(format!("{:?}", self.level))),
                json_kv("rows", json!(state.row_count().get())),
                json_kv("policy", json!(state.policy().as_str())),
            ],
        );
        Ok(())
    }

    fn on_event(
        &mut self,
        _ctx: &mut RuntimeContext<'_>,
        event: &RuntimeEvent,
    ) -> Result<EventFlow> {
        match event {
            RuntimeEvent::Key(key) if self.log_keys => {
                self.emit(
                    "event.key",
                    [
                        json_kv("code", json!(format!("{:?}", key.code))),
                        json_kv("modifiers", json!(format!("{:?}", key.modifiers))),
                        json_kv("kind", json!(format!("{:?}", key.kind))),
                    ],
                );
            }
            RuntimeEvent::Mouse(mouse) if self.log_mouse => {
                self.emit(
                    "event.mouse",
                    [
                        json_kv("kind", json!(format!("{:?}", mouse.kind))),
                        json_kv("column", json!(mouse.column)),
                        json_kv("row", json!(mouse.row)),
                    ],
                );
            }
            RuntimeEvent::Paste(data) if self.log_paste => {
                self.emit(
                    "event.paste",
                    [json_kv("chars", json!(data.chars().count()))],
                );
            }
            RuntimeEvent::FocusGained => {
                self.emit("event.focus_gained", std::iter::empty());
            }
            RuntimeEvent::FocusLost => {
                self.emit("event.focus_lost", std::iter::empty());
            }
            RuntimeEvent::Resize(size) => {
                self.emit(
                    "event.resize",
                    [
                        json_kv("width", json!(size.width)),
                        json_kv("height", json!(size.height)),
                    ],
                );
            }
            _ => {}
        }

        Ok(EventFlow::Continue)
    }

    fn on_transition(&mut self, action: &Action, outcome: &Outcome, state: &SeatingState) {
        if !self.log_drags {
            return;
        }
        let message = match (action, outcome) {
            (_, Outcome::DragStarted(_)) => "drag.started",
            (_, Outcome::DragCancelled) => "drag.cancelled",
            (Action::CompleteDrag { .. }, Outcome::Swapped { .. }) => "drag.dropped",
            (Action::CompleteDrag { .. }, Outcome::Rejected(_)) => "drag.refused",
            (_, Outcome::Regenerated { .. }) if state.generation() > 1 => "chart.regenerated",
            _ => return,
        };
        self.emit(
            message,
            [
                json_kv("outcome", json!(outcome.describe())),
                json_kv("generation", json!(state.generation())),
                json_kv("holding", json!(state.drag().is_some())),
            ],
        );
    }
}

/// Periodically emits runtime metrics snapshots through the provided logger.
pub struct MetricsSnapshotPlugin {
    logger: Logger,
    metrics: Arc<Mutex<RuntimeMetrics>>,
    target: String,
    interval: Duration,
    last_emit: Option<Instant>,
    started_at: Instant,
}

impl MetricsSnapshotPlugin {
    pub fn new(logger: Logger, metrics: Arc<Mutex<RuntimeMetrics>>) -> Self {
        Self {
            logger,
            metrics,
            target: METRICS_TARGET.to_string(),
            interval: Duration::from_secs(5),
            last_emit: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    fn emit_snapshot(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return;
            }
        }

        self.last_emit = Some(now);
        let uptime = now.duration_since(self.started_at);

        if let Ok(guard) = self.metrics.lock() {
            let event = guard.snapshot(uptime).to_log_event(&self.target);
            let _ = self.logger.log_event(event);
        }
    }
}

impl ChartPlugin for MetricsSnapshotPlugin {
    fn name(&self) -> &str {
        "diagnostics.metrics_snapshot"
    }

    fn init(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.started_at = Instant::now();
        self.last_emit = None;
        Ok(())
    }

    fn before_render(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        self.emit_snapshot();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crate::runtime::ChartRuntime;
    use crate::seating::Coord;
    use crate::Size;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

    #[test]
    fn lifecycle_logger_records_keys_and_drags() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        let mut runtime = ChartRuntime::new(SeatingState::default(), Size::new(120, 30));
        runtime.register_plugin(LifecycleLoggerPlugin::new(logger));

        runtime.dispatch_action(Action::BeginDrag(Coord::new(0, 0)));
        runtime.dispatch_action(Action::CompleteDrag {
            source: Coord::new(0, 0),
            target: Coord::new(1, 0),
        });
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                vec![RuntimeEvent::Key(KeyEvent::new(
                    KeyCode::Char('q'),
                    KeyModifiers::NONE,
                ))],
            )
            .unwrap();

        let events = sink.events();
        assert!(events.iter().all(|event| event.target == LIFECYCLE_TARGET));
        let messages = sink.messages();
        assert_eq!(
            messages,
            vec![
                "drag.started".to_string(),
                "drag.dropped".to_string(),
                "plugin_initialized".to_string(),
                "event.key".to_string(),
            ]
        );
    }

    #[test]
    fn metrics_plugin_respects_interval() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        let metrics = Arc::new(Mutex::new(RuntimeMetrics::new()));

        let mut plugin = MetricsSnapshotPlugin::new(logger.clone(), Arc::clone(&metrics))
            .with_interval(Duration::from_secs(3600));
        plugin.emit_snapshot();
        plugin.emit_snapshot();
        assert_eq!(sink.messages(), vec!["runtime_metrics".to_string()]);
        assert_eq!(sink.events()[0].target, METRICS_TARGET);

        let mut silent = MetricsSnapshotPlugin::new(logger, metrics).with_interval(Duration::ZERO);
        silent.emit_snapshot();
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn lifecycle_logger_toggles_choose_what_is_recorded() {
        let sink = MemorySink::new();
        let plugin = LifecycleLoggerPlugin::new(Logger::new(sink.clone()))
            .with_level(LogLevel::Info)
            .log_keys(false)
            .log_paste(false)
            .log_drags(false)
            .log_mouse(true);
        let mut runtime = ChartRuntime::new(SeatingState::default(), Size::new(120, 30));
        runtime.register_plugin(plugin);

        runtime.dispatch_action(Action::BeginDrag(Coord::new(0, 0)));
        let mut out = Vec::new();
        runtime
            .run_scripted(
                &mut out,
                vec![
                    RuntimeEvent::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
                    RuntimeEvent::Paste("12".to_string()),
                    RuntimeEvent::Mouse(MouseEvent {
                        kind: MouseEventKind::Moved,
                        column: 3,
                        row: 4,
                        modifiers: KeyModifiers::NONE,
                    }),
                ],
            )
            .unwrap();

        assert_eq!(
            sink.messages(),
            vec!["plugin_initialized".to_string(), "event.mouse".to_string()]
        );
        assert!(sink.events().iter().all(|event| event.level == LogLevel::Info));
        let mouse = &sink.events()[1];
        assert_eq!(mouse.field("column"), Some(&json!(3)));
    }
}
