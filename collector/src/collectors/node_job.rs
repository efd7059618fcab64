use super::{
    Job,
    JobFuture,
};
use crate::{
    client::AgentApi,
    definitions::AGENT_DEFINITIONS,
    error::{
        CollectError,
        Step,
        StepFailure,
    },
    latency::LatencyDistribution,
    mapping::map_snapshot,
    metrics::{
        Entity,
        EntityData,
        MetricKind,
        MetricRecord,
    },
    topology::Node,
};
use std::sync::Arc;
use tracing::{
    debug,
    warn,
};

pub const AGENT_EVENT_TYPE: &str = "ConsulAgentSample";
const PEERS_METRIC: &str = "agent.peers";

/// Empty agent record carrying the identifying attributes of `node`.
pub fn agent_record(node: &Node) -> MetricRecord {
    let entity = node.entity();
    MetricRecord::new(AGENT_EVENT_TYPE)
        .with_attribute("displayName", entity.name.clone())
        .with_attribute("entityName", entity.qualified_name())
        .with_attribute("datacenter", node.datacenter.clone())
        .with_attribute("ip", node.address.clone())
}

/// Metric collection for one agent: core metrics, peer count and latency.
pub struct NodeJob {
    name: String,
    entity: Entity,
    api: Arc<dyn AgentApi>,
    record: MetricRecord,
}

/// What a [`NodeJob`] produced, including the sub-steps that failed.
#[derive(Debug)]
pub struct NodeReport {
    pub node: String,
    pub entity: Entity,
    pub record: MetricRecord,
    pub failures: Vec<StepFailure>,
}

impl NodeReport {
    pub fn failed(&self, step: Step) -> bool {
        self.failures.iter().any(|failure| failure.step == step)
    }

    pub fn into_entity_data(self) -> EntityData {
        let mut data = EntityData::new(self.entity);
        data.metrics.push(self.record);
        data
    }
}

impl NodeJob {
    pub fn new(node: &Node) -> Self {
        Self::with_api(node.name.clone(), node.entity(), node.client.clone(), agent_record(node))
    }

    pub fn with_api(name: impl Into<String>, entity: Entity, api: Arc<dyn AgentApi>, record: MetricRecord) -> Self {
        Self {
            name: name.into(),
            entity,
            api,
            record,
        }
    }

    async fn collect(self) -> NodeReport {
        let Self {
            name,
            entity,
            api,
            mut record,
        } = self;
        let mut failures = Vec::new();
        let mut fail = |step: Step, error: CollectError| {
            warn!(node = %name, %step, "Skipping sub-step: {error}");
            failures.push(StepFailure::new(step, error));
        };

        debug!(node = %name, "Collecting core metrics");
        match api.metrics().await {
            Ok(snapshot) => map_snapshot(&mut record, &snapshot, &AGENT_DEFINITIONS),
            Err(err) => fail(Step::CoreMetrics, err.into()),
        }

        match api.peers().await {
            Ok(peers) => record.set_metric(PEERS_METRIC, peers.len() as f64, MetricKind::Gauge),
            Err(err) => fail(Step::PeerCount, err.into()),
        }

        match latency(api.as_ref(), &name).await {
            Ok(distribution) => distribution.record_into(&mut record),
            Err(err) => fail(Step::Latency, err),
        }

        NodeReport {
            node: name,
            entity,
            record,
            failures,
        }
    }
}

async fn latency(api: &dyn AgentApi, node: &str) -> Result<LatencyDistribution, CollectError> {
    let entries = api.coordinates().await?;
    Ok(LatencyDistribution::estimate(node, &entries)?)
}

impl Job for NodeJob {
    type Output = NodeReport;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(self) -> JobFuture<NodeReport> {
        Box::pin(self.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::ConsulClient,
        collectors::testing::StubAgent,
        error::LatencyError,
    };
    use pretty_assertions::assert_eq;

    fn job(agent: StubAgent) -> NodeJob {
        NodeJob::with_api(
            "consul-0",
            Entity::new("10.0.0.1:8301", "co-agent"),
            Arc::new(agent),
            MetricRecord::new(AGENT_EVENT_TYPE),
        )
    }

    #[test]
    fn agent_record_identifies_the_node() {
        let node = Node {
            name: "consul-0".to_string(),
            address: "10.0.0.1".to_string(),
            serf_port: 8301,
            datacenter: "dc1".to_string(),
            is_leader: false,
            client: Arc::new(ConsulClient::new(
                reqwest::Client::new(),
                url::Url::parse("http://10.0.0.1:8500/").unwrap(),
                None,
            )),
        };

        let record = agent_record(&node);

        assert_eq!(record.event_type, "ConsulAgentSample");
        assert_eq!(record.attributes.get("displayName").unwrap(), "10.0.0.1:8301");
        assert_eq!(record.attributes.get("entityName").unwrap(), "co-agent:10.0.0.1:8301");
        assert_eq!(record.attributes.get("datacenter").unwrap(), "dc1");
        assert_eq!(record.attributes.get("ip").unwrap(), "10.0.0.1");
    }

    #[tokio::test]
    async fn healthy_agent_fills_every_sub_step() {
        let report = job(StubAgent::healthy()).run().await;

        assert!(report.failures.is_empty());
        let record = &report.record;
        assert_eq!(record.value("runtime.goroutines"), Some(49.0));
        assert_eq!(record.value("runtime.heapObjects"), Some(33463.0));
        assert_eq!(record.value("runtime.virtualAddressSpaceInBytes"), Some(14395640.0));
        assert_eq!(record.value("runtime.allocations"), Some(115210850.0));
        assert_eq!(record.value("runtime.frees"), Some(115177384.0));
        assert_eq!(record.value("runtime.gcPauseInMilliseconds"), Some(679636350.0 / 1_000_000.0));
        assert_eq!(record.value("runtime.gcCycles"), Some(24701.0));
        assert_eq!(record.value("agent.aclCacheHit"), Some(2.0));
        assert_eq!(record.value("agent.txnAvgInMilliseconds"), Some(3.0));
        assert_eq!(record.value("agent.txns"), Some(1.0));
        assert_eq!(record.value("agent.txnMaxInMilliseconds"), Some(5.0));
        assert_eq!(record.value(PEERS_METRIC), Some(3.0));
        assert!(record.contains("net.agent.p99LatencyInMilliseconds"));
    }

    #[tokio::test]
    async fn failed_sub_steps_leave_the_rest_in_place() {
        let agent = StubAgent {
            metrics: None,
            ..StubAgent::healthy()
        };

        let report = job(agent).run().await;

        assert!(report.failed(Step::CoreMetrics));
        assert!(!report.failed(Step::PeerCount));
        assert!(!report.record.contains("runtime.goroutines"));
        assert_eq!(report.record.value(PEERS_METRIC), Some(3.0));
        assert!(report.record.contains("net.agent.medianLatencyInMilliseconds"));
    }

    #[tokio::test]
    async fn missing_coordinate_is_a_latency_failure() {
        let agent = StubAgent::healthy();
        let report = NodeJob::with_api(
            "consul-9",
            Entity::new("10.0.0.9:8301", "co-agent"),
            Arc::new(agent),
            MetricRecord::new(AGENT_EVENT_TYPE),
        )
        .run()
        .await;

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0].error,
            CollectError::Latency(LatencyError::NodeNotFound(node)) if node == "consul-9"
        ));
        assert!(!report.record.contains("net.agent.minLatencyInMilliseconds"));
    }

    #[tokio::test]
    async fn unreachable_agent_yields_an_empty_record() {
        let report = job(StubAgent::default()).run().await;

        assert_eq!(report.failures.len(), 3);
        assert!(report.record.is_empty());

        let data = report.into_entity_data();
        assert_eq!(data.metrics.len(), 1);
        assert_eq!(data.entity.qualified_name(), "co-agent:10.0.0.1:8301");
    }
}
