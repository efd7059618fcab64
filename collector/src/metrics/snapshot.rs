use serde::{
    Deserialize,
    Serialize,
};

/// Instantaneous reading from the `Gauges` bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GaugeValue {
    pub name: String,
    pub value: f64,
}

/// Aggregated observation from the `Counters` or `Samples` bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SampledValue {
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

/// Body of `/v1/agent/metrics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub gauges: Vec<GaugeValue>,
    #[serde(default)]
    pub counters: Vec<SampledValue>,
    #[serde(default)]
    pub samples: Vec<SampledValue>,
}
