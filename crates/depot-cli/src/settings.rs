use std::path::Path;
use std::path::PathBuf;

use depot_core::Config;
use depot_core::ConfigError;
use depot_core::Endpoint;
use tracing::debug;

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub server: Option<Endpoint>,
    pub root: Option<String>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("depot").join("config.toml"))
}

pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
    let mut config = match explicit {
        Some(path) => Config::load(path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "using user config");
                Config::load(&path)?
            }
            None => Config::default(),
        },
    };
    apply(&mut config, overrides);
    Ok(config)
}

fn apply(config: &mut Config, overrides: &Overrides) {
    if let Some(port) = overrides.port {
        config.client.port = port;
    }
    if let Some(server) = &overrides.server {
        config.server.address = server.address.clone();
        config.server.port = server.port;
    }
    if let Some(root) = &overrides.root {
        config.repository.root = root.clone();
    }
}
