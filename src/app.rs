use color_eyre::Result;
use consul_fleet_collector::{
    IntegrationPayload,
    JsonSink,
    Orchestrator,
    PublishingSink,
};
use consul_fleet_config::{
    Args,
    Config,
};
use eyre::Context as _;
use std::io;

/// One collection cycle, from configuration to published payload.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args).wrap_err("Failed to load configuration")?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Verbosity after layering defaults, config files and flags.
    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    pub async fn run(self) -> Result<()> {
        info!(
            hostname = %self.config.hostname,
            fan_out = self.config.fan_out,
            workers = self.config.workers,
            "Starting collection"
        );
        let pretty = self.config.pretty;

        let data = Orchestrator::new(self.config)?
            .collect()
            .await
            .wrap_err("Error collecting metrics")?;
        let payload = IntegrationPayload::from(data);

        JsonSink::new(io::stdout().lock(), pretty)
            .publish(&payload)
            .wrap_err("Failed to publish metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_follows_the_loaded_configuration() {
        let app = App::from_config(Config {
            verbose: true,
            ..Config::default()
        })
        .unwrap();
        assert!(app.verbose());

        assert!(!App::from_config(Config::default()).unwrap().verbose());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = Config {
            timeout: "never".to_string(),
            ..Config::default()
        };
        assert!(App::from_config(config).is_err());
    }
}
