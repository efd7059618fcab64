#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod http_client;

pub use app_config::get_config_dir;
pub use args::Args;
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
use url::Url;

/// Number of collection workers used when nothing else is configured.
pub const DEFAULT_WORKERS: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub hostname: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-call timeout in humantime notation.
    pub timeout: String,
    #[serde(default)]
    pub enable_ssl: bool,
    #[serde(default)]
    pub trust_server_certificate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_bundle_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_bundle_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub fan_out: bool,
    #[serde(default = "default_true")]
    pub check_leadership: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub metrics: bool,
    #[serde(default)]
    pub inventory: bool,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::build(args, &get_config_dir())
    }

    fn build(args: Args, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        if let Some(path) = &args.config {
            debug!(path = %path.display(), "Layering explicit config file");
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    /// Rejects combinations that cannot produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.enable_ssl
            && !self.trust_server_certificate
            && self.ca_bundle_file.is_none()
            && self.ca_bundle_dir.is_none()
        {
            bail!(
                "invalid configuration: must specify a certificate file or bundle when using SSL and not trusting \
                 server certificate"
            );
        }
        if self.workers == 0 {
            bail!("invalid configuration: workers must be at least 1");
        }
        self.timeout()?;
        Ok(())
    }

    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout).wrap_err_with(|| format!("Invalid timeout '{}'", self.timeout))
    }

    /// Neither `metrics` nor `inventory` set means both are collected.
    pub fn collect_metrics(&self) -> bool {
        self.metrics || !self.inventory
    }

    pub fn collect_inventory(&self) -> bool {
        self.inventory || !self.metrics
    }

    pub fn scheme(&self) -> &'static str {
        if self.enable_ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL of the HTTP API of the agent reachable at `host`.
    pub fn agent_url(&self, host: &str) -> Result<Url> {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        let raw = format!("{}://{}:{}/", self.scheme(), host, self.port);
        Url::parse(&raw).wrap_err_with(|| format!("Invalid agent address '{raw}'"))
    }
}
