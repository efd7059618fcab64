use super::MetricKind;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use tracing::{
    debug,
    error,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricValue {
    pub value: f64,
    pub kind: MetricKind,
}

/// Output accumulator of one collection pass over one entity.
///
/// A record is owned by exactly one job. It holds at most one value per metric
/// name; a definition that found nothing leaves no entry rather than a zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    pub event_type: String,
    pub attributes: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, MetricValue>,
}

impl MetricRecord {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Records `value` under `name`. Non-finite values are refused.
    pub fn set_metric(&mut self, name: &str, value: f64, kind: MetricKind) {
        if !value.is_finite() {
            error!("Error setting metric {name}: {value} is not a finite number");
            return;
        }
        if let Some(previous) = self.metrics.insert(name.to_string(), MetricValue { value, kind }) {
            debug!(metric = name, previous = previous.value, value, "Metric overwritten");
        }
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|metric| metric.value)
    }

    pub fn kind(&self, name: &str) -> Option<MetricKind> {
        self.metrics.get(name).map(|metric| metric.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
