//! Reduces an agent's raw telemetry into named metrics.
//!
//! Every definition is resolved by exact name against one bucket of the
//! snapshot. A definition without a matching sample writes nothing: agents of
//! different versions report different key sets, so absence is expected and
//! only logged at debug level.

use crate::{
    definitions::{
        DefinitionSet,
        MetricDefinition,
        TimerDefinition,
        GC_PAUSE_API_KEY,
    },
    metrics::{
        GaugeValue,
        MetricRecord,
        MetricsSnapshot,
        SampledValue,
    },
};
use std::collections::HashMap;
use tracing::debug;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Applies all three tables of `definitions` to `snapshot`.
pub fn map_snapshot(record: &mut MetricRecord, snapshot: &MetricsSnapshot, definitions: &DefinitionSet) {
    map_gauges(record, &snapshot.gauges, definitions.gauges);
    map_counters(record, &snapshot.counters, definitions.counters);
    map_timers(record, &snapshot.samples, definitions.timers);
}

pub fn map_gauges(record: &mut MetricRecord, gauges: &[GaugeValue], definitions: &[MetricDefinition]) {
    for def in definitions {
        match gauges.iter().find(|gauge| gauge.name == def.api_key) {
            Some(gauge) => {
                let value = if def.api_key == GC_PAUSE_API_KEY {
                    gauge.value / NANOS_PER_MILLI
                } else {
                    gauge.value
                };
                record.set_metric(def.metric_name, value, def.kind);
            }
            None => not_found(def),
        }
    }
}

pub fn map_counters(record: &mut MetricRecord, counters: &[SampledValue], definitions: &[MetricDefinition]) {
    for def in definitions {
        match counters.iter().find(|counter| counter.name == def.api_key) {
            Some(counter) => record.set_metric(def.metric_name, counter.count as f64, def.kind),
            None => not_found(def),
        }
    }
}

/// Maps timer definitions and returns how many times the sample bucket was
/// scanned. Definitions sharing an API key cost a single scan.
pub fn map_timers(record: &mut MetricRecord, samples: &[SampledValue], definitions: &[TimerDefinition]) -> usize {
    let mut cache = SampleCache::new(samples);

    for def in definitions {
        let Some(sample) = cache.lookup(def.api_key()) else {
            not_found(&def.metric);
            continue;
        };
        record.set_metric(def.metric.metric_name, def.operation.reduce(sample), def.metric.kind);
    }

    cache.scans()
}

fn not_found(def: &MetricDefinition) {
    debug!(
        "Did not find metric '{}' matching API key '{}'",
        def.metric_name, def.api_key
    );
}

/// Name lookup over one sample bucket that remembers hits and misses for the
/// duration of a mapping pass.
#[derive(Debug)]
pub struct SampleCache<'a> {
    samples: &'a [SampledValue],
    resolved: HashMap<&'a str, Option<&'a SampledValue>>,
    scans: usize,
}

impl<'a> SampleCache<'a> {
    pub fn new(samples: &'a [SampledValue]) -> Self {
        Self {
            samples,
            resolved: HashMap::new(),
            scans: 0,
        }
    }

    pub fn lookup(&mut self, api_key: &'a str) -> Option<&'a SampledValue> {
        if let Some(resolved) = self.resolved.get(api_key) {
            return *resolved;
        }
        self.scans += 1;
        let found = self.samples.iter().find(|sample| sample.name == api_key);
        self.resolved.insert(api_key, found);
        found
    }

    pub fn scans(&self) -> usize {
        self.scans
    }
}
