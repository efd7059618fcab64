//! Canned Consul endpoints for collector tests.

use crate::{
    client::{
        AgentApi,
        AgentSelf,
        ApiFuture,
        CatalogApi,
        CatalogNode,
        HealthCheck,
        Member,
        ServiceEntry,
    },
    error::ClientError,
    metrics::{
        Coordinate,
        CoordinateEntry,
        GaugeValue,
        MetricsSnapshot,
        SampledValue,
    },
};
use std::collections::BTreeMap;

fn reply<T: Clone + Send + 'static>(value: &Option<T>, endpoint: &str) -> ApiFuture<'static, T> {
    let result = value.clone().ok_or_else(|| ClientError::Status {
        url: format!("http://stub{endpoint}"),
        status: 503,
    });
    Box::pin(std::future::ready(result))
}

/// Agent whose endpoints answer from memory; `None` makes the endpoint fail.
#[derive(Debug, Clone, Default)]
pub struct StubAgent {
    pub metrics: Option<MetricsSnapshot>,
    pub peers: Option<Vec<String>>,
    pub coordinates: Option<Vec<CoordinateEntry>>,
    pub agent_self: Option<AgentSelf>,
}

impl StubAgent {
    /// Member of [`cluster`] with every endpoint answering.
    pub fn healthy() -> Self {
        Self {
            metrics: Some(agent_snapshot()),
            peers: Some(vec![
                "10.0.0.1:8300".to_string(),
                "10.0.0.2:8300".to_string(),
                "10.0.0.3:8300".to_string(),
            ]),
            coordinates: Some(cluster()),
            agent_self: None,
        }
    }
}

impl AgentApi for StubAgent {
    fn metrics(&self) -> ApiFuture<'_, MetricsSnapshot> {
        reply(&self.metrics, "/v1/agent/metrics")
    }

    fn peers(&self) -> ApiFuture<'_, Vec<String>> {
        reply(&self.peers, "/v1/status/peers")
    }

    fn coordinates(&self) -> ApiFuture<'_, Vec<CoordinateEntry>> {
        reply(&self.coordinates, "/v1/coordinate/nodes")
    }

    fn agent_self(&self) -> ApiFuture<'_, AgentSelf> {
        reply(&self.agent_self, "/v1/agent/self")
    }
}

#[derive(Debug, Clone, Default)]
pub struct StubCatalog {
    pub members: Option<Vec<Member>>,
    pub leader: Option<String>,
    pub nodes: Option<Vec<CatalogNode>>,
    pub services: Option<BTreeMap<String, Vec<String>>>,
    pub health: BTreeMap<String, Vec<ServiceEntry>>,
}

impl CatalogApi for StubCatalog {
    fn members(&self) -> ApiFuture<'_, Vec<Member>> {
        reply(&self.members, "/v1/agent/members")
    }

    fn leader(&self) -> ApiFuture<'_, String> {
        reply(&self.leader, "/v1/status/leader")
    }

    fn catalog_nodes(&self) -> ApiFuture<'_, Vec<CatalogNode>> {
        reply(&self.nodes, "/v1/catalog/nodes")
    }

    fn catalog_services(&self) -> ApiFuture<'_, BTreeMap<String, Vec<String>>> {
        reply(&self.services, "/v1/catalog/services")
    }

    fn service_health<'a>(&'a self, service: &'a str) -> ApiFuture<'a, Vec<ServiceEntry>> {
        reply(&self.health.get(service).cloned(), &format!("/v1/health/service/{service}"))
    }
}

pub fn gauge(name: &str, value: f64) -> GaugeValue {
    GaugeValue {
        name: name.to_string(),
        value,
    }
}

pub fn sample(name: &str, count: u64, mean: f64, min: f64, max: f64) -> SampledValue {
    SampledValue {
        name: name.to_string(),
        count,
        mean,
        min,
        max,
    }
}

/// What a freshly started agent reports on `/v1/agent/metrics`.
pub fn agent_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        gauges: vec![
            gauge("consul.runtime.free_count", 115177384.0),
            gauge("consul.runtime.heap_objects", 33463.0),
            gauge("consul.runtime.malloc_count", 115210850.0),
            gauge("consul.runtime.num_goroutines", 49.0),
            gauge("consul.runtime.sys_bytes", 14395640.0),
            gauge("consul.runtime.total_gc_pause_ns", 679636350.0),
            gauge("consul.runtime.total_gc_runs", 24701.0),
        ],
        counters: vec![sample("consul.acl.cache_hit", 2, 1.0, 1.0, 1.0)],
        samples: vec![
            sample("consul.txn.apply", 1, 3.0, 1.0, 5.0),
            sample("consul.raft.commitTime", 1, 3.0, 1.0, 5.0),
        ],
    }
}

fn coord(height: f64, adjustment: f64) -> Coordinate {
    Coordinate {
        vector: vec![1.0, 2.0, 3.0],
        error_estimate: 0.08,
        adjustment,
        height,
    }
}

/// Coordinates of a four-agent cluster.
pub fn cluster() -> Vec<CoordinateEntry> {
    vec![
        CoordinateEntry::new("consul-0", coord(0.0003466944852283233, -0.00003836604013478102)),
        CoordinateEntry::new("consul-1", coord(0.00004579452297003133, -0.00002374826302067419)),
        CoordinateEntry::new("consul-2", coord(0.00019087018135238138, -0.0000457158939839238)),
        CoordinateEntry::new("vault-0", coord(0.00001, -0.00002838544900300396)),
    ]
}

pub fn service_entry(node: &str, statuses: &[(&str, &str)]) -> ServiceEntry {
    ServiceEntry {
        node: CatalogNode {
            node: node.to_string(),
            address: String::new(),
            datacenter: "dc1".to_string(),
        },
        checks: statuses
            .iter()
            .map(|(check_id, status)| HealthCheck {
                node: node.to_string(),
                check_id: check_id.to_string(),
                name: String::new(),
                status: status.to_string(),
                service_id: String::new(),
            })
            .collect(),
    }
}
