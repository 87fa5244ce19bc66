//! Mocked GraphQL APIs for tests.
//!
//! A [`MockNetwork`] builds an executable schema from SDL or an introspection
//! result and answers every field of it with a mock: the one registered for
//! the field, else the one registered for its type, else a generated
//! placeholder. Requests reach it either directly with
//! [`MockNetwork::query`] or over HTTP once [`MockNetwork::start`] has been
//! called.
//!
//! Mocks come in layers. [`MockNetwork::add_mocks`] merges a new layer over
//! the current mocks and [`MockNetwork::reset_mocks`] goes back to the ones the
//! network was created with.

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod config;
mod error;
mod handler;
mod merge;
mod mock;
mod network;
mod resolver;
mod schema;
mod server;
mod transport;

pub use config::{AutoMockConfig, MockNetworkConfig, NetworkConfig, SchemaConfig};
pub use error::{Error, Result};
pub use handler::{GraphqlRequest, HandlerError, MockHandler, ServerWatcher};
pub use merge::merge_mocks;
pub use mock::{Arguments, FieldMocks, Mock, MockError, MockLayer, Producer};
pub use network::{MockNetwork, MockNetworkBuilder};
pub use schema::{MockSchema, MockSchemaBuilder, DEFAULT_LIST_LENGTH};
pub use server::{ExecutionResult, GraphqlError, Location, MockServer};
pub use transport::{HttpTransport, Transport, DEFAULT_LISTEN_ADDRESS, DEFAULT_PATH};
