use super::SampledValue;
use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumString,
};

/// How a recorded value is interpreted by the consumer of the payload.
#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MetricKind {
    Gauge,
    Rate,
}

/// Statistic extracted from a timed sample.
#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatOperation {
    Average,
    Max,
    /// Midrange of the sample, `(min + max) / 2`. Timed samples only carry
    /// aggregates so a true median cannot be derived.
    Median,
    Count,
}

impl StatOperation {
    pub fn reduce(&self, sample: &SampledValue) -> f64 {
        match self {
            StatOperation::Average => sample.mean,
            StatOperation::Max => sample.max,
            StatOperation::Median => (sample.min + sample.max) / 2.0,
            StatOperation::Count => sample.count as f64,
        }
    }
}
