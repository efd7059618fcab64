use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

const CONFIG_DIR_ENV: &str = "CONSUL_FLEET_CONFIG_DIR";

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "consul-fleet-metrics")
}

/// Directory searched for an optional `config.yaml`.
///
/// `CONSUL_FLEET_CONFIG_DIR` wins over the platform default.
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    project_directory()
        .map(|dirs| dirs.config_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}
