use crate::logging::{LogEvent, LogFields, LogLevel};
use crate::state::Outcome;
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by the editor runtime.
#[derive(Debug, Default, Clone)]
pub struct RuntimeMetrics {
    events: u64,
    renders: u64,
    dirty_panels: u64,
    generations: u64,
    swaps: u64,
    rejections: u64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_render(&mut self, dirty_count: usize) {
        self.renders = self.renders.saturating_add(1);
        self.dirty_panels = self.dirty_panels.saturating_add(dirty_count as u64);
    }

    /// Tally the result of one reducer step.
    pub fn record_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Regenerated { .. } => self.generations = self.generations.saturating_add(1),
            Outcome::Swapped { .. } => self.swaps = self.swaps.saturating_add(1),
            Outcome::Rejected(_) => self.rejections = self.rejections.saturating_add(1),
            Outcome::DragStarted(_) | Outcome::DragCancelled | Outcome::Unchanged => {}
        }
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            renders: self.renders,
            dirty_panels: self.dirty_panels,
            generations: self.generations,
            swaps: self.swaps,
            rejections: self.rejections,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub renders: u64,
    pub dirty_panels: u64,
    pub generations: u64,
    pub swaps: u64,
    pub rejections: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "runtime_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("events".to_string(), json!(self.events));
        map.insert("renders".to_string(), json!(self.renders));
        map.insert("dirty_panels".to_string(), json!(self.dirty_panels));
        map.insert("generations".to_string(), json!(self.generations));
        map.insert("swaps".to_string(), json!(self.swaps));
        map.insert("rejections".to_string(), json!(self.rejections));
        map
    }
}
