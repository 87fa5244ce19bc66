use std::net::SocketAddr;

use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    error::{Error, Result},
    handler::MockHandler,
};

/// How intercepted requests reach the handler.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Starts delivering requests to `handler`.
    async fn start(&mut self, handler: MockHandler) -> Result<()>;

    /// Stops delivering requests. Stopping a stopped transport does nothing.
    async fn stop(&mut self) -> Result<()>;

    /// The URL the code under test should send its requests to, once known.
    fn url(&self) -> Option<String>;
}

pub const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::V4(std::net::SocketAddrV4::new(
    std::net::Ipv4Addr::LOCALHOST,
    0,
));

pub const DEFAULT_PATH: &str = "/graphql";

/// Serves the handler over HTTP on a local port.
///
/// Once bound, the port is kept across restarts so the URL given to the code
/// under test stays valid.
#[derive(Debug)]
pub struct HttpTransport {
    listen_address: SocketAddr,
    path: String,
    bound_address: Option<SocketAddr>,
    running: Option<Running>,
}

#[derive(Debug)]
struct Running {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_LISTEN_ADDRESS, DEFAULT_PATH)
    }
}

impl HttpTransport {
    pub fn new(listen_address: SocketAddr, path: impl Into<String>) -> Self {
        Self {
            listen_address,
            path: path.into(),
            bound_address: None,
            running: None,
        }
    }

    /// The address the server is, or was last, listening on.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.bound_address
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn start(&mut self, handler: MockHandler) -> Result<()> {
        let address = self.bound_address.unwrap_or(self.listen_address);

        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|source| Error::Bind { address, source })?;

        let bound_address = listener
            .local_addr()
            .map_err(|source| Error::Bind { address, source })?;

        let app = handler.into_router(&self.path);
        let (shutdown, shutdown_receiver) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_receiver.await.ok();
                })
                .await
        });

        self.bound_address = Some(bound_address);
        self.running = Some(Running { shutdown, task });

        tracing::info!("mock GraphQL server listening on http://{bound_address}{}", self.path);

        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(Running { shutdown, task }) = self.running.take() else {
            return Ok(());
        };

        shutdown.send(()).ok();
        task.await?.map_err(|err| Error::Server(err.to_string()))?;

        tracing::info!("mock GraphQL server stopped");

        Ok(())
    }

    fn url(&self) -> Option<String> {
        self.bound_address
            .map(|address| format!("http://{address}{}", self.path))
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.shutdown.send(()).ok();
        }
    }
}
