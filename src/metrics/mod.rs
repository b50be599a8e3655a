use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated across layout passes.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    passes: u64,
    items_laid_out: u64,
    rows_emitted: u64,
    rows_replaced: u64,
    rejected: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful pass over `items` that produced `rows`, replacing
    /// `replaced` rows already on screen.
    pub fn record_pass(&mut self, items: usize, rows: usize, replaced: usize) {
        self.passes = self.passes.saturating_add(1);
        self.items_laid_out = self.items_laid_out.saturating_add(items as u64);
        self.rows_emitted = self.rows_emitted.saturating_add(rows as u64);
        self.rows_replaced = self.rows_replaced.saturating_add(replaced as u64);
    }

    pub fn record_rejection(&mut self) {
        self.rejected = self.rejected.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            passes: self.passes,
            items_laid_out: self.items_laid_out,
            rows_emitted: self.rows_emitted,
            rows_replaced: self.rows_replaced,
            rejected: self.rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub passes: u64,
    pub items_laid_out: u64,
    pub rows_emitted: u64,
    pub rows_replaced: u64,
    pub rejected: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("items_laid_out".to_string(), json!(self.items_laid_out));
        map.insert("rows_emitted".to_string(), json!(self.rows_emitted));
        map.insert("rows_replaced".to_string(), json!(self.rows_replaced));
        map.insert("rejected".to_string(), json!(self.rejected));
        map
    }
}
