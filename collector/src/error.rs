use std::fmt;

/// Failure talking to one agent's HTTP API.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Response from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid API URL: {0}")]
    Url(String),
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Url(err.to_string())
    }
}

/// The latency estimate cannot be computed from the known coordinates.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LatencyError {
    #[error("cluster only contains {0} node(s) with a coordinate")]
    InsufficientNodes(usize),
    #[error("could not find coordinate for node '{0}'")]
    NodeNotFound(String),
    #[error("coordinate dimensions differ: {0} vs {1}")]
    DimensionMismatch(usize, usize),
}

/// Failure of one sub-step of a collection job.
#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Latency(#[from] LatencyError),
}

/// Sub-steps of the collection jobs, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    CoreMetrics,
    PeerCount,
    Latency,
    NodeCount,
    HealthCounts,
    Inventory,
}

/// A sub-step that was skipped because it failed.
#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub error: CollectError,
}

impl StepFailure {
    pub fn new(step: Step, error: impl Into<CollectError>) -> Self {
        Self {
            step,
            error: error.into(),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.error)
    }
}
