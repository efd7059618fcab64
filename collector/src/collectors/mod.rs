//! Collection jobs and the machinery that runs them.
//!
//! - **`FanOutCollector`**: bounded worker pool running one [`Job`] per node
//! - **`NodeJob`**: core metrics, peer count and latency of one agent
//! - **`InventoryJob`**: configuration inventory of one agent
//! - **`DatacenterCollector`**: datacenter-wide metrics read through the leader
//! - **`Orchestrator`**: drives a whole cycle in fan-out or local mode

pub mod datacenter;
pub mod fan_out;
pub mod inventory_job;
pub mod job;
pub mod node_job;
pub mod orchestrator;
#[cfg(test)]
pub(crate) mod testing;

pub use datacenter::{
    DatacenterCollector,
    DatacenterError,
    DatacenterReport,
};
pub use fan_out::FanOutCollector;
pub use inventory_job::{
    InventoryJob,
    InventoryReport,
};
pub use job::{
    Job,
    JobFuture,
};
pub use node_job::{
    NodeJob,
    NodeReport,
};
pub use orchestrator::Orchestrator;
