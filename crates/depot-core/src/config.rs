use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::endpoint::Endpoint;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub server: ServerConfig,
    pub repository: RepositoryConfig,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn client_endpoint(&self) -> Endpoint {
        self.client.endpoint()
    }

    pub fn server_endpoint(&self) -> Endpoint {
        self.server.endpoint()
    }
}

/// Listening identity of this client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 8082,
        }
    }
}

impl ClientConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.address.clone(), self.port)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.address.clone(), self.port)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Remote root pushed onto every view's path stack.
    pub root: String,
    /// Where the server drops files requested with `viewFile`.
    pub local_files: PathBuf,
    pub view_file_location: String,
    pub status_capacity: usize,
    pub reply_policy: ReplyPolicy,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root: "codeRepository/remoteRepositoryFiles".to_string(),
            local_files: PathBuf::from("codeRepository/localClientFiles"),
            view_file_location: "../codeRepository/localClientFiles/ViewFile".to_string(),
            status_capacity: 200,
            reply_policy: ReplyPolicy::LatestWins,
        }
    }
}

/// How listing replies are reconciled with the view's current path.
///
/// Replies carry no correlation id, so with `LatestWins` a slow reply for a
/// path the user already left overwrites the current listing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPolicy {
    #[default]
    LatestWins,
    /// Drop listing replies whose echoed `path` is not the view's current top.
    MatchCurrentPath,
}
