use super::{
    Job,
    JobFuture,
};
use crate::{
    client::AgentApi,
    error::{
        Step,
        StepFailure,
    },
    inventory::collect_inventory,
    metrics::{
        Entity,
        EntityData,
        Inventory,
    },
    topology::Node,
};
use std::sync::Arc;
use tracing::warn;

/// Configuration inventory for one agent.
pub struct InventoryJob {
    name: String,
    entity: Entity,
    api: Arc<dyn AgentApi>,
}

#[derive(Debug)]
pub struct InventoryReport {
    pub node: String,
    pub entity: Entity,
    pub inventory: Inventory,
    pub failure: Option<StepFailure>,
}

impl InventoryReport {
    pub fn into_entity_data(self) -> EntityData {
        let mut data = EntityData::new(self.entity);
        data.inventory = self.inventory;
        data
    }
}

impl InventoryJob {
    pub fn new(node: &Node) -> Self {
        Self::with_api(node.name.clone(), node.entity(), node.client.clone())
    }

    pub fn with_api(name: impl Into<String>, entity: Entity, api: Arc<dyn AgentApi>) -> Self {
        Self {
            name: name.into(),
            entity,
            api,
        }
    }

    async fn collect(self) -> InventoryReport {
        let (inventory, failure) = match self.api.agent_self().await {
            Ok(agent_self) => (collect_inventory(&agent_self), None),
            Err(err) => {
                warn!(node = %self.name, "Skipping inventory: {err}");
                (Inventory::new(), Some(StepFailure::new(Step::Inventory, err)))
            }
        };

        InventoryReport {
            node: self.name,
            entity: self.entity,
            inventory,
            failure,
        }
    }
}

impl Job for InventoryJob {
    type Output = InventoryReport;

    fn name(&self) -> String {
        format!("{} inventory", self.name)
    }

    fn run(self) -> JobFuture<InventoryReport> {
        Box::pin(self.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::testing::StubAgent;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn job(agent: StubAgent) -> InventoryJob {
        InventoryJob::with_api("consul-0", Entity::new("10.0.0.1:8301", "co-agent"), Arc::new(agent))
    }

    #[tokio::test]
    async fn records_the_agent_configuration() {
        let agent_self = match json!({
            "Config": { "Datacenter": "dc1", "Server": true },
            "Member": { "Tags": { "role": "consul" } }
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let agent = StubAgent {
            agent_self: Some(agent_self),
            ..StubAgent::default()
        };

        let report = job(agent).run().await;

        assert!(report.failure.is_none());
        let data = report.into_entity_data();
        assert!(data.metrics.is_empty());
        assert_eq!(
            data.inventory.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["Config/Datacenter", "Config/Server", "Member/Tags/role"]
        );
    }

    #[tokio::test]
    async fn failing_self_call_skips_the_inventory() {
        let report = job(StubAgent::default()).run().await;

        assert!(report.inventory.is_empty());
        assert_eq!(report.failure.map(|failure| failure.step), Some(Step::Inventory));
    }
}
