//! Round-trip latency estimates derived from network coordinates.
//!
//! See <https://developer.hashicorp.com/consul/docs/architecture/coordinates>:
//! the estimated RTT between two nodes is the Euclidean distance of their
//! coordinate vectors plus both heights, corrected by both adjustment terms.

use crate::{
    error::LatencyError,
    metrics::{
        stats,
        Coordinate,
        CoordinateEntry,
        MetricKind,
        MetricRecord,
    },
};

const SECONDS_TO_MILLIS: f64 = 1000.0;

/// Metric name and percentile rank of every reported percentile.
const PERCENTILES: [(&str, f64); 5] = [
    ("net.agent.p25LatencyInMilliseconds", 0.25),
    ("net.agent.p75LatencyInMilliseconds", 0.75),
    ("net.agent.p90LatencyInMilliseconds", 0.90),
    ("net.agent.p95LatencyInMilliseconds", 0.95),
    ("net.agent.p99LatencyInMilliseconds", 0.99),
];

/// Estimated RTT between `a` and `b` in milliseconds. Symmetric in its
/// arguments.
pub fn distance(a: &Coordinate, b: &Coordinate) -> Result<f64, LatencyError> {
    if a.vector.len() != b.vector.len() {
        return Err(LatencyError::DimensionMismatch(a.vector.len(), b.vector.len()));
    }

    let sum_sq: f64 = a
        .vector
        .iter()
        .zip(&b.vector)
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    let mut rtt = sum_sq.sqrt() + (a.height + b.height);

    // A negative adjusted value is meaningless; keep the raw estimate then.
    let adjusted = rtt + (a.adjustment + b.adjustment);
    if adjusted > 0.0 {
        rtt = adjusted;
    }

    Ok(rtt * SECONDS_TO_MILLIS)
}

/// Sorted latencies from one node to every other known node.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyDistribution {
    latencies: Vec<f64>,
}

impl LatencyDistribution {
    /// Estimates the latency from `node` to every other node in `entries`.
    pub fn estimate(node: &str, entries: &[CoordinateEntry]) -> Result<Self, LatencyError> {
        if entries.len() < 2 {
            return Err(LatencyError::InsufficientNodes(entries.len()));
        }

        let target = entries
            .iter()
            .find(|entry| entry.node == node)
            .ok_or_else(|| LatencyError::NodeNotFound(node.to_string()))?;

        let mut latencies = entries
            .iter()
            .filter(|other| other.node != target.node)
            .map(|other| distance(&target.coord, &other.coord))
            .collect::<Result<Vec<_>, _>>()?;

        // Every entry may belong to the node itself, e.g. one per network segment.
        if latencies.is_empty() {
            return Err(LatencyError::InsufficientNodes(1));
        }

        latencies.sort_by(f64::total_cmp);
        Ok(Self { latencies })
    }

    pub fn latencies(&self) -> &[f64] {
        &self.latencies
    }

    pub fn min(&self) -> f64 {
        self.latencies[0]
    }

    pub fn max(&self) -> f64 {
        self.latencies[self.latencies.len() - 1]
    }

    pub fn median(&self) -> f64 {
        stats::median(&self.latencies).unwrap_or_default()
    }

    pub fn percentile(&self, p: f64) -> f64 {
        stats::percentile(&self.latencies, p).unwrap_or_default()
    }

    /// Writes the eight summary gauges.
    pub fn record_into(&self, record: &mut MetricRecord) {
        record.set_metric("net.agent.medianLatencyInMilliseconds", self.median(), MetricKind::Gauge);
        record.set_metric("net.agent.minLatencyInMilliseconds", self.min(), MetricKind::Gauge);
        record.set_metric("net.agent.maxLatencyInMilliseconds", self.max(), MetricKind::Gauge);
        for (name, p) in PERCENTILES {
            record.set_metric(name, self.percentile(p), MetricKind::Gauge);
        }
    }
}
