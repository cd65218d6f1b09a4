use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointParseError {
    #[error("endpoint `{0}` is missing a `:port` suffix")]
    MissingPort(String),
    #[error("endpoint `{0}` has an empty address")]
    EmptyAddress(String),
    #[error("endpoint `{token}` has an invalid port `{port}`")]
    InvalidPort { token: String, port: String },
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Single-token form embedded in the `to` / `from` message fields.
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let Some((address, port)) = token.rsplit_once(':') else {
            return Err(EndpointParseError::MissingPort(token.to_string()));
        };
        if address.is_empty() {
            return Err(EndpointParseError::EmptyAddress(token.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| EndpointParseError::InvalidPort {
                token: token.to_string(),
                port: port.to_string(),
            })?;
        Ok(Self::new(address, port))
    }
}
