use async_graphql_parser::types::ServiceDocument;
use cynic_introspection::IntrospectionQuery;

use crate::error::{Error, Result};

/// Where a schema comes from, once the text has been inspected.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SchemaSource {
    Sdl(String),
    Introspection(serde_json::Value),
}

impl SchemaSource {
    /// Text parsing as JSON is an introspection result, a JSON string
    /// literal holds SDL, anything else is SDL.
    pub(crate) fn detect(source: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(source) {
            Ok(serde_json::Value::String(sdl)) => Self::Sdl(sdl),
            Ok(value) => Self::Introspection(value),
            Err(_) => Self::Sdl(source.to_owned()),
        }
    }

    pub(crate) fn into_sdl(self) -> Result<String> {
        match self {
            Self::Sdl(sdl) => Ok(sdl),
            Self::Introspection(value) => introspection_to_sdl(value),
        }
    }

    pub(crate) fn parse(self) -> Result<(String, ServiceDocument)> {
        let sdl = self.into_sdl()?;
        let document = async_graphql_parser::parse_schema(&sdl).map_err(|err| Error::SchemaParse(err.to_string()))?;

        Ok((sdl, document))
    }
}

/// Accepts both a full response, `{"data": {"__schema": ...}}`, and its data.
fn introspection_to_sdl(value: serde_json::Value) -> Result<String> {
    let data = if value.get("data").is_some() {
        let response = serde_json::from_value::<cynic::GraphQlResponse<serde_json::Value>>(value)
            .map_err(|err| Error::Introspection(err.to_string()))?;

        match response.data {
            Some(data) => data,
            None => {
                let messages = response
                    .errors
                    .unwrap_or_default()
                    .into_iter()
                    .map(|error| error.message)
                    .collect::<Vec<_>>();

                return Err(Error::Introspection(format!(
                    "the response has no data, errors: [{}]",
                    messages.join(", ")
                )));
            }
        }
    } else {
        value
    };

    if data.get("__schema").map_or(true, serde_json::Value::is_null) {
        return Err(Error::Introspection("missing __schema".to_owned()));
    }

    let query =
        serde_json::from_value::<IntrospectionQuery>(data).map_err(|err| Error::Introspection(err.to_string()))?;

    let schema = query
        .into_schema()
        .map_err(|err| Error::Introspection(err.to_string()))?;

    Ok(schema.to_sdl())
}
