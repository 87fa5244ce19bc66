use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::server::{ExecutionResult, MockServer};

/// A GraphQL request as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
        }
    }
}

/// Why a request never reached the mock server. Only that request fails.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Request body missing")]
    MissingBody,
    #[error("Invalid GraphQL request: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejecting mocked GraphQL request");

        let body = serde_json::json!({
            "errors": [{ "message": self.to_string() }]
        });

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

pub type ServerWatcher = watch::Receiver<Arc<MockServer>>;

/// Answers intercepted requests from the current mock server.
///
/// Every request works on a snapshot of the mock server taken when it
/// started: mocks changing meanwhile do not affect it.
#[derive(Debug, Clone)]
pub struct MockHandler {
    server: ServerWatcher,
}

impl MockHandler {
    pub fn new(server: ServerWatcher) -> Self {
        Self { server }
    }

    pub fn current_server(&self) -> Arc<MockServer> {
        self.server.borrow().clone()
    }

    /// Handles the raw body of a POST request.
    pub async fn handle_body(&self, body: Option<&[u8]>) -> Result<ExecutionResult, HandlerError> {
        let body = body.filter(|body| !body.is_empty()).ok_or(HandlerError::MissingBody)?;
        let request: GraphqlRequest = serde_json::from_slice(body)?;

        Ok(self.handle(request).await)
    }

    pub async fn handle(&self, request: GraphqlRequest) -> ExecutionResult {
        let server = self.current_server();

        tracing::debug!(operation_name = ?request.operation_name, "handling mocked GraphQL request");

        server.execute(request).await
    }

    /// Serves GET and POST GraphQL requests on `path`.
    pub fn into_router(self, path: &str) -> Router {
        Router::new()
            .route(path, get(execute_get).post(execute_post))
            .with_state(self)
    }
}

#[derive(Debug, Deserialize)]
struct GetParameters {
    query: Option<String>,
    variables: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
}

async fn execute_get(
    State(handler): State<MockHandler>,
    Query(parameters): Query<GetParameters>,
) -> Result<Json<ExecutionResult>, HandlerError> {
    let query = parameters
        .query
        .filter(|query| !query.is_empty())
        .ok_or(HandlerError::MissingBody)?;

    let variables = parameters
        .variables
        .map(|variables| serde_json::from_str(&variables))
        .transpose()?;

    let request = GraphqlRequest {
        query,
        variables,
        operation_name: parameters.operation_name,
    };

    Ok(Json(handler.handle(request).await))
}

async fn execute_post(State(handler): State<MockHandler>, body: Bytes) -> Result<Json<ExecutionResult>, HandlerError> {
    handler.handle_body(Some(&body[..])).await.map(Json)
}
