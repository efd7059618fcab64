//! Which agents exist in the cluster and how to reach each of them.

use crate::{
    client::{
        AgentSelf,
        CatalogApi,
        ConsulClient,
        Member,
    },
    error::ClientError,
    metrics::Entity,
};
use consul_fleet_config::Config;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{
    debug,
    warn,
};

pub const AGENT_ENTITY_TYPE: &str = "co-agent";
pub const DATACENTER_ENTITY_TYPE: &str = "datacenter";

#[derive(thiserror::Error, Debug)]
pub enum TopologyError {
    #[error("Failed to list cluster members: {0}")]
    Members(#[source] ClientError),
    #[error("Failed to look up the cluster leader: {0}")]
    Leader(#[source] ClientError),
    #[error("Failed to describe the local agent: {0}")]
    LocalAgent(#[source] ClientError),
    #[error("Agent self description is missing '{0}'")]
    MissingField(&'static str),
    #[error("Failed to build a client for {node}: {reason}")]
    Client { node: String, reason: String },
}

/// One agent of the cluster, valid for a single collection cycle.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub address: String,
    pub serf_port: u16,
    pub datacenter: String,
    pub is_leader: bool,
    pub client: Arc<ConsulClient>,
}

impl Node {
    fn from_member(member: &Member, is_leader: bool, client: ConsulClient) -> Self {
        Self {
            name: member.name.clone(),
            address: member.addr.clone(),
            serf_port: member.port,
            datacenter: member.tags.get("dc").cloned().unwrap_or_default(),
            is_leader,
            client: Arc::new(client),
        }
    }

    /// Agents are reported as `co-agent:<address>:<serf port>`.
    pub fn entity(&self) -> Entity {
        Entity::new(format!("{}:{}", self.address, self.serf_port), AGENT_ENTITY_TYPE)
            .with_id_attribute(AGENT_ENTITY_TYPE, self.name.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub nodes: Vec<Node>,
}

impl Topology {
    pub fn leader(&self) -> Option<&Node> {
        self.nodes.iter().find(|node| node.is_leader)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lists the cluster members through `catalog` and builds a client per member.
pub async fn discover(
    catalog: &dyn CatalogApi,
    config: &Config,
    http_client: &HttpClient,
) -> Result<Topology, TopologyError> {
    let members = catalog.members().await.map_err(TopologyError::Members)?;
    let leader = catalog.leader().await.map_err(TopologyError::Leader)?;
    let leader_host = leader_host(&leader);
    if leader_host.is_none() {
        warn!("Cluster reports no leader");
    }

    let mut nodes = Vec::with_capacity(members.len());
    for member in &members {
        let client = match ConsulClient::for_host(config, http_client.clone(), &member.addr) {
            Ok(client) => client,
            Err(err) => {
                warn!(node = %member.name, "Skipping member: {err}");
                continue;
            }
        };
        let is_leader = leader_host == Some(member.addr.as_str());
        nodes.push(Node::from_member(member, is_leader, client));
    }

    debug!(nodes = nodes.len(), leader = leader_host.unwrap_or("<none>"), "Discovered topology");
    Ok(Topology { nodes })
}

/// Host part of a `/v1/status/leader` answer. An empty answer means there is
/// no leader.
pub fn leader_host(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let host = match raw.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => raw,
    };
    Some(host.trim_start_matches('[').trim_end_matches(']'))
}

/// The configured agent alone, identified from its own `/v1/agent/self`.
pub fn local_node(config: &Config, http_client: &HttpClient, agent_self: &AgentSelf) -> Result<Node, TopologyError> {
    let member = agent_self.get("Member").ok_or(TopologyError::MissingField("Member"))?;
    let member: Member =
        serde_json::from_value(member.clone()).map_err(|_| TopologyError::MissingField("Member.Name/Addr/Port"))?;

    let client =
        ConsulClient::for_host(config, http_client.clone(), &config.hostname).map_err(|err| TopologyError::Client {
            node: member.name.clone(),
            reason: err.to_string(),
        })?;

    Ok(Node::from_member(&member, is_leader(agent_self), client))
}

/// Reads `Stats.consul.leader`, which agents report either as a boolean or as
/// the string `"true"`/`"false"`. Anything else counts as not leading.
pub fn is_leader(agent_self: &AgentSelf) -> bool {
    let value = agent_self
        .get("Stats")
        .and_then(|stats| stats.get("consul"))
        .and_then(|consul| consul.get("leader"));

    match value {
        Some(Value::Bool(leader)) => *leader,
        Some(Value::String(leader)) => leader.parse::<bool>().unwrap_or_else(|_| {
            warn!("Leadership value '{leader}' is not a bool, assuming not leader");
            false
        }),
        _ => false,
    }
}
