use crate::{
    error::ClientError,
    metrics::{
        CoordinateEntry,
        MetricsSnapshot,
    },
};
use consul_fleet_config::Config;
use eyre::Result;
use reqwest::Client as HttpClient;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    future::Future,
    pin::Pin,
};
use tracing::debug;
use url::Url;

const TOKEN_HEADER: &str = "X-Consul-Token";

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Body of `/v1/agent/self`. Its layout depends on the agent version and is
/// only ever inspected key by key.
pub type AgentSelf = serde_json::Map<String, serde_json::Value>;

/// Endpoints served by every agent about itself.
pub trait AgentApi: Send + Sync {
    fn metrics(&self) -> ApiFuture<'_, MetricsSnapshot>;

    fn peers(&self) -> ApiFuture<'_, Vec<String>>;

    fn coordinates(&self) -> ApiFuture<'_, Vec<CoordinateEntry>>;

    fn agent_self(&self) -> ApiFuture<'_, AgentSelf>;
}

/// Cluster-wide endpoints, queried through a single agent.
pub trait CatalogApi: Send + Sync {
    fn members(&self) -> ApiFuture<'_, Vec<Member>>;

    /// Raft address (`ip:port`) of the current leader.
    fn leader(&self) -> ApiFuture<'_, String>;

    fn catalog_nodes(&self) -> ApiFuture<'_, Vec<CatalogNode>>;

    fn catalog_services(&self) -> ApiFuture<'_, BTreeMap<String, Vec<String>>>;

    fn service_health<'a>(&'a self, service: &'a str) -> ApiFuture<'a, Vec<ServiceEntry>>;
}

/// Element of `/v1/agent/members`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Member {
    pub name: String,
    pub addr: String,
    pub port: u16,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub status: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogNode {
    pub node: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub datacenter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    #[serde(default)]
    pub node: String,
    #[serde(rename = "CheckID", default)]
    pub check_id: String,
    #[serde(default)]
    pub name: String,
    pub status: String,
    #[serde(rename = "ServiceID", default)]
    pub service_id: String,
}

/// Element of `/v1/health/service/<name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceEntry {
    pub node: CatalogNode,
    #[serde(default)]
    pub checks: Vec<HealthCheck>,
}

/// HTTP client for one agent.
#[derive(Clone, Debug)]
pub struct ConsulClient {
    http_client: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl ConsulClient {
    pub fn new(http_client: HttpClient, base_url: Url, token: Option<String>) -> Self {
        Self {
            http_client,
            base_url,
            token,
        }
    }

    /// Client for the agent at `host`, with scheme, port and token from `config`.
    pub fn for_host(config: &Config, http_client: HttpClient, host: &str) -> Result<Self> {
        Ok(Self::new(http_client, config.agent_url(host)?, config.token.clone()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let mut request = self.http_client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn get_path<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.get(self.endpoint(path)?).await
    }
}

impl AgentApi for ConsulClient {
    fn metrics(&self) -> ApiFuture<'_, MetricsSnapshot> {
        Box::pin(self.get_path("v1/agent/metrics"))
    }

    fn peers(&self) -> ApiFuture<'_, Vec<String>> {
        Box::pin(self.get_path("v1/status/peers"))
    }

    fn coordinates(&self) -> ApiFuture<'_, Vec<CoordinateEntry>> {
        Box::pin(self.get_path("v1/coordinate/nodes"))
    }

    fn agent_self(&self) -> ApiFuture<'_, AgentSelf> {
        Box::pin(self.get_path("v1/agent/self"))
    }
}

impl CatalogApi for ConsulClient {
    fn members(&self) -> ApiFuture<'_, Vec<Member>> {
        Box::pin(self.get_path("v1/agent/members"))
    }

    fn leader(&self) -> ApiFuture<'_, String> {
        Box::pin(self.get_path("v1/status/leader"))
    }

    fn catalog_nodes(&self) -> ApiFuture<'_, Vec<CatalogNode>> {
        Box::pin(self.get_path("v1/catalog/nodes"))
    }

    fn catalog_services(&self) -> ApiFuture<'_, BTreeMap<String, Vec<String>>> {
        Box::pin(self.get_path("v1/catalog/services"))
    }

    fn service_health<'a>(&'a self, service: &'a str) -> ApiFuture<'a, Vec<ServiceEntry>> {
        Box::pin(async move {
            let mut url = self.endpoint("v1/health/service/")?;
            url.path_segments_mut()
                .map_err(|_| ClientError::Url(format!("{} cannot carry a path", self.base_url)))?
                .pop_if_empty()
                .push(service);
            self.get(url).await
        })
    }
}
