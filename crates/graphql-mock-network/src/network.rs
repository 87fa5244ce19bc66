use std::{net::SocketAddr, path::Path, sync::Arc};

use tokio::sync::watch;

use crate::{
    config::{MockNetworkConfig, SchemaConfig},
    error::Result,
    handler::MockHandler,
    merge::merge_mocks,
    mock::MockLayer,
    schema::{read_schema_file, MockSchema, DEFAULT_LIST_LENGTH},
    server::{ExecutionResult, MockServer},
    transport::{HttpTransport, Transport, DEFAULT_LISTEN_ADDRESS, DEFAULT_PATH},
};

/// Answers GraphQL requests from a mocked schema.
///
/// ```no_run
/// # async fn example() -> graphql_mock_network::Result<()> {
/// use graphql_mock_network::{Mock, MockLayer, MockNetwork};
/// use serde_json::json;
///
/// let mocks = MockLayer::new().with_field_mock("Query", "todo", Mock::from_fn(|_| json!({ "title": "T" })));
/// let mut network = MockNetwork::new("type Query { todo: Todo } type Todo { title: String }", mocks)?;
///
/// network.start().await?;
/// println!("send requests to {}", network.url().unwrap_or_default());
///
/// network.add_mocks(MockLayer::new().with_mock("String", Mock::value("everywhere")));
/// network.reset_mocks();
/// network.stop().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockNetwork<T: Transport = HttpTransport> {
    schema: MockSchema,
    default_mocks: MockLayer,
    current_mocks: MockLayer,
    server: watch::Sender<Arc<MockServer>>,
    handler: MockHandler,
    transport: T,
    started: bool,
}

impl MockNetwork {
    /// Builds a network from SDL or an introspection result, served over HTTP
    /// on a random local port.
    pub fn new(source: impl AsRef<str>, mocks: MockLayer) -> Result<Self> {
        Self::builder(source).mocks(mocks).build()
    }

    pub fn from_path(path: impl AsRef<Path>, mocks: MockLayer) -> Result<Self> {
        Self::new(read_schema_file(path.as_ref())?, mocks)
    }

    pub fn from_config(config: &MockNetworkConfig, mocks: MockLayer) -> Result<Self> {
        let source = match &config.schema {
            SchemaConfig::Path(path) => read_schema_file(path)?,
            SchemaConfig::Source(source) => source.clone(),
        };

        Self::builder(source)
            .listen_address(config.network.listen_address)
            .path(&config.network.path)
            .list_length(config.auto_mock.list_length)
            .mocks(mocks)
            .build()
    }

    pub fn builder(source: impl AsRef<str>) -> MockNetworkBuilder {
        MockNetworkBuilder {
            source: source.as_ref().to_owned(),
            mocks: MockLayer::new(),
            listen_address: DEFAULT_LISTEN_ADDRESS,
            path: DEFAULT_PATH.to_owned(),
            list_length: DEFAULT_LIST_LENGTH,
        }
    }
}

impl<T: Transport> MockNetwork<T> {
    /// A network delivering requests through `transport`.
    pub fn with_transport(schema: MockSchema, mocks: MockLayer, transport: T) -> Self {
        let server = Arc::new(MockServer::new(schema.clone(), mocks.clone()));
        let (server, receiver) = watch::channel(server);

        Self {
            schema,
            default_mocks: mocks.clone(),
            current_mocks: mocks,
            server,
            handler: MockHandler::new(receiver),
            transport,
            started: false,
        }
    }

    /// Executes a query against the current mocks without going through the
    /// transport.
    pub async fn query(&self, query: &str, variables: serde_json::Map<String, serde_json::Value>) -> ExecutionResult {
        let server = self.server.borrow().clone();
        server.query(query, variables).await
    }

    pub async fn start(&mut self) -> Result<()> {
        self.transport.start(self.handler.clone()).await?;
        self.started = true;

        Ok(())
    }

    /// Stops the transport. A later start serves a fresh handler.
    pub async fn stop(&mut self) -> Result<()> {
        self.transport.stop().await?;
        self.handler = MockHandler::new(self.server.subscribe());
        self.started = false;

        Ok(())
    }

    /// Merges `mocks` over the current ones.
    pub fn add_mocks(&mut self, mocks: MockLayer) {
        self.current_mocks = merge_mocks([&self.current_mocks, &mocks]);
        self.rebuild();
    }

    /// Goes back to the mocks the network was created with.
    pub fn reset_mocks(&mut self) {
        self.current_mocks = self.default_mocks.clone();
        self.rebuild();
    }

    pub fn mocks(&self) -> &MockLayer {
        &self.current_mocks
    }

    pub fn schema(&self) -> &MockSchema {
        &self.schema
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn url(&self) -> Option<String> {
        self.transport.url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn rebuild(&mut self) {
        let server = MockServer::new(self.schema.clone(), self.current_mocks.clone());

        tracing::debug!(mock_keys = self.current_mocks.len(), "rebuilding mock server");

        self.server.send_replace(Arc::new(server));
    }
}

#[derive(Debug, Clone)]
pub struct MockNetworkBuilder {
    source: String,
    mocks: MockLayer,
    listen_address: SocketAddr,
    path: String,
    list_length: usize,
}

impl MockNetworkBuilder {
    /// The default mocks, restored by [`MockNetwork::reset_mocks`].
    pub fn mocks(mut self, mocks: MockLayer) -> Self {
        self.mocks = mocks;
        self
    }

    pub fn listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn list_length(mut self, list_length: usize) -> Self {
        self.list_length = list_length;
        self
    }

    pub fn build(self) -> Result<MockNetwork> {
        let transport = HttpTransport::new(self.listen_address, self.path.clone());
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<MockNetwork<T>> {
        let schema = MockSchema::builder(&self.source).list_length(self.list_length).build()?;

        Ok(MockNetwork::with_transport(schema, self.mocks, transport))
    }
}
