use std::{net::SocketAddr, path::Path, path::PathBuf};

use crate::{
    error::{Error, Result},
    schema::DEFAULT_LIST_LENGTH,
    transport::{DEFAULT_LISTEN_ADDRESS, DEFAULT_PATH},
};

/// Configuration of a [`MockNetwork`](crate::MockNetwork), usually read from
/// a TOML file.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockNetworkConfig {
    pub schema: SchemaConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub auto_mock: AutoMockConfig,
}

impl MockNetworkConfig {
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Reads a configuration file. A relative schema path is relative to the
    /// directory of the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("reading {}: {err}", path.display())))?;

        let mut config = Self::from_toml(&content)?;

        if let SchemaConfig::Path(schema_path) = &mut config.schema {
            if let Some(parent) = path.parent().filter(|_| schema_path.is_relative()) {
                *schema_path = parent.join(&*schema_path);
            }
        }

        Ok(config)
    }
}

/// Either `path = "schema.graphql"` or `source = "type Query { ... }"`. Both
/// accept SDL and introspection results.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum SchemaConfig {
    Path(PathBuf),
    Source(String),
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Port 0 picks a free port on the first start.
    pub listen_address: SocketAddr,
    pub path: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS,
            path: DEFAULT_PATH.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoMockConfig {
    /// Items generated for unmocked list fields.
    pub list_length: usize,
}

impl Default for AutoMockConfig {
    fn default() -> Self {
        Self {
            list_length: DEFAULT_LIST_LENGTH,
        }
    }
}
