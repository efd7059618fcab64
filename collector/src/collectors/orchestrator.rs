use crate::{
    client::{
        AgentApi,
        ConsulClient,
    },
    collectors::{
        DatacenterCollector,
        FanOutCollector,
        InventoryJob,
        NodeJob,
    },
    inventory::collect_inventory,
    metrics::{
        CollectedData,
        EntityData,
    },
    topology::{
        self,
        TopologyError,
    },
};
use chrono::Utc;
use consul_fleet_config::Config;
use eyre::{
    Context as _,
    Result,
};
use reqwest::Client as HttpClient;
use tracing::{
    debug,
    error,
    info,
    warn,
};

/// Runs one collection cycle against the configured agent and, in fan-out
/// mode, every other member of its cluster.
pub struct Orchestrator {
    config: Config,
    http_client: HttpClient,
    fan_out: FanOutCollector,
}

impl Orchestrator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http_client = config.http_client()?;
        let fan_out = FanOutCollector::new(config.workers);

        Ok(Self {
            config,
            http_client,
            fan_out,
        })
    }

    fn local_client(&self) -> Result<ConsulClient> {
        ConsulClient::for_host(&self.config, self.http_client.clone(), &self.config.hostname)
            .wrap_err("Error creating API client, please check configuration")
    }

    pub async fn collect(&self) -> Result<CollectedData> {
        let mut data = CollectedData::new(Utc::now());

        if self.config.fan_out {
            self.collect_cluster(&mut data).await?;
        } else {
            self.collect_local(&mut data).await?;
        }

        data.finalize();
        info!(
            entities = data.entities.len(),
            elapsed_ms = (data.collection_end - data.collection_start).num_milliseconds(),
            "Collection finished"
        );
        Ok(data)
    }

    async fn collect_cluster(&self, data: &mut CollectedData) -> Result<()> {
        let client = self.local_client()?;
        let topology = topology::discover(&client, &self.config, &self.http_client)
            .await
            .wrap_err("Error creating agent entities")?;
        info!(nodes = topology.len(), "Collecting from cluster");

        if self.config.collect_metrics() {
            match DatacenterCollector::new(topology.leader()) {
                Ok(datacenter) => self.collect_datacenter(&datacenter, data).await,
                Err(err) => error!("Error creating datacenter entity: {err}"),
            }
        }

        if self.config.collect_inventory() {
            let jobs = topology.nodes.iter().map(InventoryJob::new).collect::<Vec<_>>();
            for report in self.fan_out.collect(jobs).await {
                if report.failure.is_none() {
                    data.push(report.into_entity_data());
                }
            }
        }

        if self.config.collect_metrics() {
            let jobs = topology.nodes.iter().map(NodeJob::new).collect::<Vec<_>>();
            for report in self.fan_out.collect(jobs).await {
                data.push(report.into_entity_data());
            }
        }

        Ok(())
    }

    async fn collect_local(&self, data: &mut CollectedData) -> Result<()> {
        let client = self.local_client()?;
        let agent_self = client
            .agent_self()
            .await
            .map_err(TopologyError::LocalAgent)
            .wrap_err("Failed to collect local agent data")?;
        let node = topology::local_node(&self.config, &self.http_client, &agent_self)?;
        info!(node = %node.name, leader = node.is_leader, "Collecting from local agent");

        if self.config.collect_metrics() {
            if self.config.check_leadership && node.is_leader {
                debug!("Checking leader metrics");
                match DatacenterCollector::new(Some(&node)) {
                    Ok(datacenter) => self.collect_datacenter(&datacenter, data).await,
                    Err(err) => error!("Failed to get datacenter metrics: {err}"),
                }
            } else {
                debug!("Not checking leader metrics");
            }

            for report in self.fan_out.collect(vec![NodeJob::new(&node)]).await {
                data.push(report.into_entity_data());
            }
        }

        if self.config.collect_inventory() {
            let mut entity = EntityData::new(node.entity());
            entity.inventory = collect_inventory(&agent_self);
            data.push(entity);
        }

        Ok(())
    }

    async fn collect_datacenter(&self, datacenter: &DatacenterCollector, data: &mut CollectedData) {
        match datacenter.collect().await {
            Ok(report) => {
                for failure in &report.failures {
                    warn!(%failure, "Datacenter sub-step failed");
                }
                data.push(report.into_entity_data());
            }
            Err(err) => error!("Failed to collect datacenter metrics: {err}"),
        }
    }
}
