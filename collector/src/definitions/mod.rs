//! Declarative mapping from Consul telemetry keys to reported metric names.

mod agent;
mod datacenter;

use crate::metrics::{
    MetricKind,
    StatOperation,
};
pub use agent::AGENT_DEFINITIONS;
pub use datacenter::DATACENTER_DEFINITIONS;

/// Gauge whose raw value is in nanoseconds and is reported in milliseconds.
pub const GC_PAUSE_API_KEY: &str = "consul.runtime.total_gc_pause_ns";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    pub api_key: &'static str,
    pub metric_name: &'static str,
    pub kind: MetricKind,
}

impl MetricDefinition {
    pub const fn new(api_key: &'static str, metric_name: &'static str, kind: MetricKind) -> Self {
        Self {
            api_key,
            metric_name,
            kind,
        }
    }

    pub const fn gauge(api_key: &'static str, metric_name: &'static str) -> Self {
        Self::new(api_key, metric_name, MetricKind::Gauge)
    }

    pub const fn rate(api_key: &'static str, metric_name: &'static str) -> Self {
        Self::new(api_key, metric_name, MetricKind::Rate)
    }
}

/// A metric derived from one statistic of a timed sample. Several timers
/// usually share an `api_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDefinition {
    pub metric: MetricDefinition,
    pub operation: StatOperation,
}

impl TimerDefinition {
    pub const fn new(metric: MetricDefinition, operation: StatOperation) -> Self {
        Self { metric, operation }
    }

    pub const fn api_key(&self) -> &'static str {
        self.metric.api_key
    }
}

/// The three definition tables applied in one mapping pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionSet {
    pub gauges: &'static [MetricDefinition],
    pub counters: &'static [MetricDefinition],
    pub timers: &'static [TimerDefinition],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique_metric_names(set: &DefinitionSet) {
        let mut names = HashSet::new();
        let all = set
            .gauges
            .iter()
            .chain(set.counters)
            .map(|def| def.metric_name)
            .chain(set.timers.iter().map(|def| def.metric.metric_name));
        for name in all {
            assert!(names.insert(name), "duplicate metric name {name}");
        }
    }

    #[test]
    fn metric_names_are_unique_per_set() {
        assert_unique_metric_names(&AGENT_DEFINITIONS);
        assert_unique_metric_names(&DATACENTER_DEFINITIONS);
    }

    #[test]
    fn gc_pause_is_an_agent_gauge() {
        assert!(AGENT_DEFINITIONS.gauges.iter().any(|def| def.api_key == GC_PAUSE_API_KEY));
    }
}
