use std::{net::SocketAddr, path::PathBuf};

/// Failures of mock network operations.
///
/// Errors raised while resolving a query never end up here: they are part of
/// the [`ExecutionResult`](crate::ExecutionResult) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The schema file could not be read.
    #[error("reading schema file {}: {source}", path.display())]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The schema source is not valid SDL.
    #[error("parsing schema: {0}")]
    SchemaParse(String),
    /// The schema source is JSON, but not an introspection result.
    #[error("invalid introspection result: {0}")]
    Introspection(String),
    /// The parsed schema was rejected while building the executable schema.
    #[error("building schema: {0}")]
    SchemaBuild(String),
    /// The transport could not listen on its address.
    #[error("binding mock server to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The transport failed while serving or shutting down.
    #[error("mock server: {0}")]
    Server(String),
    /// The configuration file could not be read or parsed.
    #[error("configuration: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Server(value.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
