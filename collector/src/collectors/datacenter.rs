//! Datacenter-wide metrics, read through the cluster leader.

use crate::{
    client::{
        AgentApi,
        CatalogApi,
        HealthCheck,
    },
    definitions::DATACENTER_DEFINITIONS,
    error::{
        ClientError,
        Step,
        StepFailure,
    },
    mapping::map_snapshot,
    metrics::{
        Entity,
        EntityData,
        MetricKind,
        MetricRecord,
    },
    topology::{
        Node,
        DATACENTER_ENTITY_TYPE,
    },
};
use std::{
    str::FromStr,
    sync::Arc,
};
use tracing::{
    debug,
    error,
    info,
};

pub const DATACENTER_EVENT_TYPE: &str = "ConsulDatacenterSample";

const NODE_MAINTENANCE_CHECK: &str = "_node_maintenance";
const SERVICE_MAINTENANCE_PREFIX: &str = "_service_maintenance:";

#[derive(thiserror::Error, Debug)]
pub enum DatacenterError {
    #[error("Datacenter metrics need a cluster leader")]
    NoLeader,
    #[error("Failed to describe the leader: {0}")]
    LeaderSelf(#[source] ClientError),
    #[error("Leader did not report Config.Datacenter")]
    MissingDatacenter,
}

/// Health of a service instance, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    Passing,
    Warning,
    Critical,
    Maintenance,
}

/// Worst status among `checks`; maintenance outranks everything and no
/// checks at all count as passing. `None` when a check reports a status
/// Consul does not define.
pub fn aggregated_status(checks: &[HealthCheck]) -> Option<HealthStatus> {
    let mut worst = HealthStatus::Passing;
    for check in checks {
        let in_maintenance =
            check.check_id == NODE_MAINTENANCE_CHECK || check.check_id.starts_with(SERVICE_MAINTENANCE_PREFIX);
        let status = if in_maintenance {
            HealthStatus::Maintenance
        } else {
            match HealthStatus::from_str(&check.status) {
                Ok(HealthStatus::Maintenance) | Err(_) => {
                    debug!(check = %check.check_id, status = %check.status, "Unknown check status");
                    return None;
                }
                Ok(status) => status,
            }
        };
        worst = worst.max(status);
    }
    Some(worst)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCounts {
    pub critical: usize,
    pub warning: usize,
    pub up: usize,
    pub passing: usize,
}

impl HealthCounts {
    pub fn add(&mut self, status: Option<HealthStatus>) {
        match status {
            Some(HealthStatus::Critical) => self.critical += 1,
            Some(HealthStatus::Warning) => self.warning += 1,
            Some(HealthStatus::Passing) => {
                self.up += 1;
                self.passing += 1;
            }
            Some(HealthStatus::Maintenance) | None => {}
        }
    }

    fn record_into(&self, record: &mut MetricRecord) {
        record.set_metric("catalog.criticalNodes", self.critical as f64, MetricKind::Gauge);
        record.set_metric("catalog.warningNodes", self.warning as f64, MetricKind::Gauge);
        record.set_metric("catalog.upNodes", self.up as f64, MetricKind::Gauge);
        record.set_metric("catalog.passingNodes", self.passing as f64, MetricKind::Gauge);
    }
}

#[derive(Debug)]
pub struct DatacenterReport {
    pub entity: Entity,
    pub record: MetricRecord,
    pub failures: Vec<StepFailure>,
}

impl DatacenterReport {
    pub fn into_entity_data(self) -> EntityData {
        let mut data = EntityData::new(self.entity);
        data.metrics.push(self.record);
        data
    }
}

pub struct DatacenterCollector {
    leader: String,
    agent: Arc<dyn AgentApi>,
    catalog: Arc<dyn CatalogApi>,
}

impl DatacenterCollector {
    /// Collector reading through `leader`, which must be present.
    pub fn new(leader: Option<&Node>) -> Result<Self, DatacenterError> {
        let leader = leader.ok_or(DatacenterError::NoLeader)?;
        Ok(Self::with_api(
            leader.entity().name,
            leader.client.clone(),
            leader.client.clone(),
        ))
    }

    pub fn with_api(leader: impl Into<String>, agent: Arc<dyn AgentApi>, catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            leader: leader.into(),
            agent,
            catalog,
        }
    }

    async fn datacenter_name(&self) -> Result<String, DatacenterError> {
        let agent_self = self.agent.agent_self().await.map_err(DatacenterError::LeaderSelf)?;
        agent_self
            .get("Config")
            .and_then(|config| config.get("Datacenter"))
            .and_then(|datacenter| datacenter.as_str())
            .map(str::to_string)
            .ok_or(DatacenterError::MissingDatacenter)
    }

    /// Collects the datacenter record. Only a missing datacenter name is an
    /// error; every sub-step failure is recorded in the report instead.
    pub async fn collect(&self) -> Result<DatacenterReport, DatacenterError> {
        let name = self.datacenter_name().await?;
        let entity = Entity::new(name, DATACENTER_ENTITY_TYPE);
        let mut record = MetricRecord::new(DATACENTER_EVENT_TYPE)
            .with_attribute("displayName", entity.name.clone())
            .with_attribute("entityName", entity.qualified_name())
            .with_attribute("leader", self.leader.clone());
        let mut failures = Vec::new();

        info!(datacenter = %entity.name, leader = %self.leader, "Collecting datacenter metrics");

        match self.agent.metrics().await {
            Ok(snapshot) => map_snapshot(&mut record, &snapshot, &DATACENTER_DEFINITIONS),
            Err(err) => {
                error!("Error collecting leader metrics for datacenter: {err}");
                failures.push(StepFailure::new(Step::CoreMetrics, err));
            }
        }

        match self.catalog.catalog_nodes().await {
            Ok(nodes) => record.set_metric("catalog.registeredNodes", nodes.len() as f64, MetricKind::Gauge),
            Err(err) => {
                error!("Error collecting node count: {err}");
                failures.push(StepFailure::new(Step::NodeCount, err));
            }
        }

        match self.health_counts().await {
            Ok(counts) => counts.record_into(&mut record),
            Err(err) => {
                error!("Error getting node health counts: {err}");
                failures.push(StepFailure::new(Step::HealthCounts, err));
            }
        }

        Ok(DatacenterReport {
            entity,
            record,
            failures,
        })
    }

    async fn health_counts(&self) -> Result<HealthCounts, ClientError> {
        let services = self.catalog.catalog_services().await?;
        let mut counts = HealthCounts::default();

        for service in services.keys() {
            let entries = self.catalog.service_health(service).await.map_err(|err| {
                error!(%service, "Error getting nodes for service");
                err
            })?;
            for entry in &entries {
                counts.add(aggregated_status(&entry.checks));
            }
        }

        Ok(counts)
    }
}
