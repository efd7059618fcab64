use clap::Parser;
use std::{
    collections::HashMap,
    path::PathBuf,
};

/// Consul fleet metrics collector
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Optional YAML file layered over the stored configuration.
    #[arg(long, env = "CONSUL_FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// The agent node hostname or IP address to connect to.
    #[arg(long, env = "CONSUL_HOSTNAME")]
    pub hostname: Option<String>,

    /// Port of the agent HTTP API.
    #[arg(long, env = "CONSUL_PORT")]
    pub port: Option<u16>,

    /// ACL token if token authentication is enabled.
    #[arg(long, env = "CONSUL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Timeout for a single API call, e.g. `30s` or `1m`.
    #[arg(long, env = "CONSUL_TIMEOUT")]
    pub timeout: Option<String>,

    /// Talk to the agents over HTTPS.
    #[arg(long = "enable-ssl", env = "CONSUL_ENABLE_SSL")]
    pub enable_ssl: Option<bool>,

    /// Skip verification of the server certificate.
    #[arg(long = "trust-server-certificate", env = "CONSUL_TRUST_SERVER_CERTIFICATE")]
    pub trust_server_certificate: Option<bool>,

    /// Alternative certificate authority bundle file.
    #[arg(long = "ca-bundle-file", env = "CONSUL_CA_BUNDLE_FILE")]
    pub ca_bundle_file: Option<PathBuf>,

    /// Alternative certificate authority bundle directory.
    #[arg(long = "ca-bundle-dir", env = "CONSUL_CA_BUNDLE_DIR")]
    pub ca_bundle_dir: Option<PathBuf>,

    /// Collect from every member of the LAN pool instead of only the local agent.
    #[arg(long = "fan-out", env = "CONSUL_FAN_OUT")]
    pub fan_out: Option<bool>,

    /// Check leadership of the local agent. Disable on agents running in client mode.
    #[arg(long = "check-leadership", env = "CONSUL_CHECK_LEADERSHIP")]
    pub check_leadership: Option<bool>,

    /// Number of concurrent collection workers.
    #[arg(long, env = "CONSUL_WORKERS")]
    pub workers: Option<usize>,

    /// Only collect metrics.
    #[arg(long)]
    pub metrics: bool,

    /// Only collect inventory.
    #[arg(long)]
    pub inventory: bool,

    /// Pretty print the JSON payload.
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl config::Source for Args {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if let Some(hostname) = &self.hostname {
            cache.insert("hostname".to_string(), hostname.clone().into());
        }
        if let Some(port) = self.port {
            cache.insert("port".to_string(), u64::from(port).into());
        }
        if let Some(token) = &self.token {
            cache.insert("token".to_string(), token.clone().into());
        }
        if let Some(timeout) = &self.timeout {
            cache.insert("timeout".to_string(), timeout.clone().into());
        }
        if let Some(enable_ssl) = self.enable_ssl {
            cache.insert("enable_ssl".to_string(), enable_ssl.into());
        }
        if let Some(trust) = self.trust_server_certificate {
            cache.insert("trust_server_certificate".to_string(), trust.into());
        }
        if let Some(file) = &self.ca_bundle_file {
            cache.insert(
                "ca_bundle_file".to_string(),
                file.to_string_lossy().into_owned().into(),
            );
        }
        if let Some(dir) = &self.ca_bundle_dir {
            cache.insert(
                "ca_bundle_dir".to_string(),
                dir.to_string_lossy().into_owned().into(),
            );
        }
        if let Some(fan_out) = self.fan_out {
            cache.insert("fan_out".to_string(), fan_out.into());
        }
        if let Some(check_leadership) = self.check_leadership {
            cache.insert("check_leadership".to_string(), check_leadership.into());
        }
        if let Some(workers) = self.workers {
            cache.insert("workers".to_string(), (workers as u64).into());
        }
        // Plain flags only ever switch something on, so an absent flag must not
        // shadow a value coming from a config file.
        for (key, flag) in [
            ("metrics", self.metrics),
            ("inventory", self.inventory),
            ("pretty", self.pretty),
            ("verbose", self.verbose),
        ] {
            if flag {
                cache.insert(key.to_string(), true.into());
            }
        }
        Ok(cache)
    }
}
