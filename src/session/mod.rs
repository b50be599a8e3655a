//! Bootstrap shim tying the incremental controller to a render adapter.
//!
//! A [`BarrelSession`] owns its adapter outright, so every layout instance
//! renders into its own container. Passes are logged and counted when the
//! [`SessionConfig`] carries a logger or a metrics handle.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;

use crate::controller::{ControllerState, IncrementalLayout};
use crate::error::{LayoutError, Result};
use crate::geometry::Measured;
use crate::layout::{LayoutResult, LayoutSettings};
use crate::logging::{LogFields, LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{LayoutMetrics, MetricSnapshot};
use crate::render::{RenderAdapter, RenderMode};

/// Configuration knobs for a layout session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Optional structured logger used for pass events.
    pub logger: Option<Logger>,
    /// Level used for successful pass events; rejections always log at warn.
    pub level: LogLevel,
    /// Target field used for pass events.
    pub log_target: String,
    /// Metrics accumulator shared with the caller.
    pub metrics: Option<Arc<Mutex<LayoutMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            logger: None,
            level: LogLevel::Debug,
            log_target: "barrel::session".to_string(),
            metrics: None,
            metrics_target: "barrel::session.metrics".to_string(),
        }
    }
}

impl SessionConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(LayoutMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<LayoutMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

pub struct BarrelSession<T, R> {
    controller: IncrementalLayout<T>,
    adapter: R,
    config: SessionConfig,
    started: Instant,
}

impl<T, R> BarrelSession<T, R>
where
    T: Measured + Clone,
    R: RenderAdapter<T>,
{
    pub fn new(settings: LayoutSettings, adapter: R) -> Result<Self> {
        Self::with_config(settings, adapter, SessionConfig::default())
    }

    pub fn with_config(
        settings: LayoutSettings,
        adapter: R,
        config: SessionConfig,
    ) -> Result<Self> {
        Ok(Self {
            controller: IncrementalLayout::new(settings)?,
            adapter,
            config,
            started: Instant::now(),
        })
    }

    pub fn controller(&self) -> &IncrementalLayout<T> {
        &self.controller
    }

    pub fn state(&self) -> &ControllerState<T> {
        self.controller.state()
    }

    pub fn adapter(&self) -> &R {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut R {
        &mut self.adapter
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lay out and render the full item list.
    ///
    /// Controller state is committed before the adapter runs; an adapter
    /// failure is logged as a rejection and returned without undoing it.
    pub fn initial(&mut self, items: &[T]) -> Result<LayoutResult<T>> {
        let result = self
            .controller
            .initial(items)
            .inspect_err(|err| self.reject("initial", err))?;

        self.adapter
            .apply(&result, RenderMode::Full)
            .inspect_err(|err| self.reject("initial", err))?;

        self.record(&result, 0);
        self.emit(
            "layout.initial",
            [
                json_kv("items", items.len()),
                json_kv("rows", result.rows.len()),
                json_kv("consumed", self.controller.state().last_item_index()),
            ],
        );
        Ok(result)
    }

    /// Lay out items appended to `snapshot` and replace the open last row.
    pub fn refresh(&mut self, snapshot: &[T]) -> Result<LayoutResult<T>> {
        let carried = self.controller.state().last_row().len();
        let result = self
            .controller
            .refresh(snapshot)
            .inspect_err(|err| self.reject("refresh", err))?;

        self.adapter
            .apply(&result, RenderMode::ReplaceLast)
            .inspect_err(|err| self.reject("refresh", err))?;

        self.record(&result, usize::from(carried > 0));
        self.emit(
            "layout.refresh",
            [
                json_kv("items", snapshot.len()),
                json_kv("carried", carried),
                json_kv("rows", result.rows.len()),
                json_kv("consumed", self.controller.state().last_item_index()),
            ],
        );
        Ok(result)
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started.elapsed()))
    }

    /// Log the current metrics snapshot, if both a logger and metrics are configured.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) = (&self.config.logger, self.metrics_snapshot()) {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    fn record(&self, result: &LayoutResult<T>, replaced: usize) {
        if let Some(metrics) = &self.config.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_pass(result.item_count(), result.rows.len(), replaced);
            }
        }
    }

    fn reject(&self, pass: &str, err: &LayoutError) {
        if let Some(metrics) = &self.config.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_rejection();
            }
        }
        if let Some(logger) = &self.config.logger {
            let event = event_with_fields(
                LogLevel::Warn,
                &self.config.log_target,
                "layout.rejected",
                [json_kv("pass", pass), json_kv("error", err.to_string())],
            );
            let _ = logger.log_event(event);
        }
    }

    fn emit(&self, message: &str, fields: impl IntoIterator<Item = (String, Value)>) {
        if let Some(logger) = &self.config.logger {
            let fields: LogFields = fields.into_iter().collect();
            let _ = logger.log_with_fields(
                self.config.level,
                &self.config.log_target,
                message,
                fields,
            );
        }
    }
}
