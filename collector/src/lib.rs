//! # Consul Fleet Collector
//!
//! Polls the agents of a Consul cluster over HTTP and turns their telemetry
//! into named metrics, latency estimates and configuration inventory.
//!
//! ## Architecture
//!
//! - **`client`**: Consul HTTP API behind the `AgentApi` and `CatalogApi` traits
//! - **`topology`**: cluster members, the leader and a client per agent
//! - **`definitions`**: which telemetry keys become which metrics
//! - **`mapping`**: applies definitions to a metrics snapshot
//! - **`latency`**: RTT estimates from network coordinates
//! - **`inventory`**: agent configuration as inventory items
//! - **`collectors`**: jobs, the fan-out pool and the orchestrator
//! - **`sink`**: serializes the collected payload
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> eyre::Result<()> {
//! use consul_fleet_collector::{
//!     IntegrationPayload,
//!     JsonSink,
//!     Orchestrator,
//!     PublishingSink,
//! };
//!
//! let config = consul_fleet_config::Config::default();
//! let data = Orchestrator::new(config)?.collect().await?;
//! JsonSink::new(std::io::stdout(), false).publish(&IntegrationPayload::from(data))?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collectors;
pub mod definitions;
pub mod error;
pub mod inventory;
pub mod latency;
pub mod mapping;
pub mod metrics;
pub mod sink;
pub mod topology;

pub use collectors::*;
pub use error::*;
pub use metrics::*;
pub use sink::{
    IntegrationPayload,
    JsonSink,
    PublishingSink,
};
