//! Filter Processor - drop unwanted records on a payload byte match
//!
//! Records are opaque to the pipeline, so the filter matches raw payload
//! bytes. That is enough for the common cases (drop health-check noise,
//! keep only one service's lines) without forcing a payload schema.

use std::sync::atomic::{AtomicU64, Ordering};

use sluice_core::{Batch, Processor, ProcessorError, Record};

/// How the pattern is matched against a record payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Pattern occurs anywhere in the payload
    #[default]
    Contains,
    /// Payload begins with the pattern
    StartsWith,
}

/// What to do with records that match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterAction {
    /// Keep matching records, drop everything else
    #[default]
    Keep,
    /// Drop matching records, keep everything else
    Drop,
}

/// Configuration for [`FilterProcessor`]
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Byte pattern matched against each payload
    pub pattern: Vec<u8>,

    /// Match strategy
    pub mode: MatchMode,

    /// Whether a match keeps or drops the record
    pub action: FilterAction,
}

impl FilterConfig {
    /// Create a config matching `pattern`
    pub fn new(pattern: impl Into<Vec<u8>>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Set the match mode
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the filter action
    pub fn with_action(mut self, action: FilterAction) -> Self {
        self.action = action;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.pattern.is_empty() {
            return Err("filter pattern must not be empty".into());
        }
        Ok(())
    }
}

/// Stateless processor that keeps or drops records by payload match
pub struct FilterProcessor {
    config: FilterConfig,

    /// Records removed by this filter
    records_dropped: AtomicU64,
}

impl FilterProcessor {
    /// Create a filter processor from a validated config
    pub fn new(config: FilterConfig) -> Result<Self, ProcessorError> {
        config.validate().map_err(ProcessorError::config)?;

        Ok(Self {
            config,
            records_dropped: AtomicU64::new(0),
        })
    }

    /// Records dropped so far
    #[inline]
    pub fn records_dropped(&self) -> u64 {
        self.records_dropped.load(Ordering::Relaxed)
    }

    fn matches(&self, record: &Record) -> bool {
        let payload = record.payload().as_ref();
        let pattern = self.config.pattern.as_slice();

        match self.config.mode {
            MatchMode::StartsWith => payload.starts_with(pattern),
            MatchMode::Contains => payload
                .windows(pattern.len())
                .any(|window| window == pattern),
        }
    }
}

impl Processor for FilterProcessor {
    fn execute(&self, batch: Batch) -> Result<Batch, ProcessorError> {
        let before = batch.count();

        let kept: Batch = batch
            .into_iter()
            .filter(|record| match self.config.action {
                FilterAction::Keep => self.matches(record),
                FilterAction::Drop => !self.matches(record),
            })
            .collect();

        let dropped = before - kept.count();
        if dropped > 0 {
            self.records_dropped
                .fetch_add(dropped as u64, Ordering::Relaxed);
            tracing::trace!(dropped, kept = kept.count(), "filter removed records");
        }

        Ok(kept)
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
