//! Per-platform warning accumulator
//!
//! Optional-artifact failures are recorded here instead of aborting the run.
//! The caller owns the aggregator, starts a run with `begin_run` and drains it
//! with `flush` once compilation succeeded.

use crate::platform::Platform;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Short tag, usually the `platform.modName` key of the failing artifact
    pub tag: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Default)]
pub struct WarningAggregator {
    warnings: Mutex<BTreeMap<Platform, Vec<Warning>>>,
}

impl WarningAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop anything left over from a previous run
    pub fn begin_run(&self) {
        self.warnings.lock().clear();
    }

    pub fn add_warning(
        &self,
        platform: Platform,
        tag: impl Into<String>,
        message: impl Into<String>,
        link: Option<&str>,
    ) {
        let warning = Warning {
            tag: tag.into(),
            message: message.into(),
            link: link.map(str::to_string),
        };
        warn!("[{}] {}: {}", platform, warning.tag, warning.message);
        self.warnings
            .lock()
            .entry(platform)
            .or_default()
            .push(warning);
    }

    /// Snapshot without draining
    pub fn warnings(&self, platform: Platform) -> Vec<Warning> {
        self.warnings
            .lock()
            .get(&platform)
            .cloned()
            .unwrap_or_default()
    }

    /// Drain the warnings recorded for one platform
    pub fn flush(&self, platform: Platform) -> Vec<Warning> {
        self.warnings.lock().remove(&platform).unwrap_or_default()
    }

    /// Drain everything, grouped by platform
    pub fn flush_all(&self) -> BTreeMap<Platform, Vec<Warning>> {
        std::mem::take(&mut *self.warnings.lock())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings.lock().values().any(|list| !list.is_empty())
    }

    pub fn count(&self) -> usize {
        self.warnings.lock().values().map(Vec::len).sum()
    }
}
