use std::sync::Arc;

use async_graphql::{PathSegment, Variables};
use serde::{Deserialize, Serialize};

use crate::{handler::GraphqlRequest, mock::MockLayer, schema::MockSchema};

/// A schema paired with one effective mock set.
///
/// There is no way to change the mocks of a server: a new server is built
/// instead.
#[derive(Debug, Clone)]
pub struct MockServer {
    schema: MockSchema,
    mocks: Arc<MockLayer>,
}

impl MockServer {
    pub fn new(schema: MockSchema, mocks: MockLayer) -> Self {
        Self {
            schema,
            mocks: Arc::new(mocks),
        }
    }

    pub fn schema(&self) -> &MockSchema {
        &self.schema
    }

    pub fn mocks(&self) -> &MockLayer {
        &self.mocks
    }

    /// Executes `query`. Resolution failures end up in the `errors` of the
    /// result, this never fails.
    pub async fn query(&self, query: &str, variables: serde_json::Map<String, serde_json::Value>) -> ExecutionResult {
        self.execute(GraphqlRequest {
            query: query.to_owned(),
            variables: Some(variables),
            operation_name: None,
        })
        .await
    }

    pub async fn execute(&self, request: GraphqlRequest) -> ExecutionResult {
        let mut graphql_request = async_graphql::Request::new(request.query).data(self.mocks.clone());

        if let Some(variables) = request.variables {
            graphql_request = graphql_request.variables(Variables::from_json(serde_json::Value::Object(variables)));
        }

        if let Some(operation_name) = request.operation_name {
            graphql_request = graphql_request.operation_name(operation_name);
        }

        self.schema.execute(graphql_request).await.into()
    }
}

/// The response to a GraphQL request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<async_graphql::Response> for ExecutionResult {
    fn from(response: async_graphql::Response) -> Self {
        let mut errors: Vec<GraphqlError> = response.errors.into_iter().map(GraphqlError::from).collect();

        let data = match response.data.into_json() {
            Ok(data) => data,
            Err(err) => {
                errors.push(GraphqlError {
                    message: format!("response data is not representable as JSON: {err}"),
                    locations: Vec::new(),
                    path: Vec::new(),
                });

                serde_json::Value::Null
            }
        };

        Self { data, errors }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<async_graphql::ServerError> for GraphqlError {
    fn from(error: async_graphql::ServerError) -> Self {
        Self {
            message: error.message,
            locations: error
                .locations
                .into_iter()
                .map(|pos| Location {
                    line: pos.line,
                    column: pos.column,
                })
                .collect(),
            path: error
                .path
                .into_iter()
                .map(|segment| match segment {
                    PathSegment::Field(name) => serde_json::Value::String(name),
                    PathSegment::Index(index) => serde_json::Value::from(index),
                })
                .collect(),
        }
    }
}
