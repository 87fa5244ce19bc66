//! Field errors as GraphQL reports them.
//!
//! A failing field resolves to null and its error carries the response path
//! of the field. A null in a non-null position nulls the closest nullable
//! parent instead, and the whole `data` when there is none.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_graphql::{
    extensions::{Extension, ExtensionContext, ExtensionFactory, NextExecute, NextResolve, ResolveInfo},
    PathSegment, QueryPathNode, QueryPathSegment, Response, ServerError, ServerResult, Value,
};

pub(crate) struct NullPropagation;

impl ExtensionFactory for NullPropagation {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(NullPropagationExtension::default())
    }
}

#[derive(Default)]
struct NullPropagationExtension {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    errors: Vec<ServerError>,
    /// Non-null positions that resolved to null.
    nulled: Vec<Vec<PathSegment>>,
}

impl NullPropagationExtension {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Extension for NullPropagationExtension {
    async fn execute(
        &self,
        ctx: &ExtensionContext<'_>,
        operation_name: Option<&str>,
        next: NextExecute<'_>,
    ) -> Response {
        let mut response = next.run(ctx, operation_name).await;
        let mut state = self.state();

        if state.nulled.iter().any(|path| path.len() == 1) {
            response.data = Value::Null;
        }

        response.errors.append(&mut state.errors);
        response
    }

    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        if info.is_for_introspection {
            return next.run(ctx, info).await;
        }

        let non_null = info.return_type.ends_with('!');
        let path_node = info.path_node;

        let result = next.run(ctx, info).await;

        let path = response_path(path_node);
        let mut state = self.state();

        match result {
            Ok(value) if !state.nulled.iter().any(|nulled| is_child(nulled, &path)) => return Ok(value),
            Ok(_) => {}
            Err(mut error) => {
                if error.path.is_empty() {
                    error.path.clone_from(&path);
                }

                state.errors.push(error);
            }
        }

        if non_null {
            state.nulled.push(path);
        }

        Ok(None)
    }
}

fn response_path(node: &QueryPathNode<'_>) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let mut current = Some(node);

    while let Some(node) = current {
        path.push(match node.segment {
            QueryPathSegment::Index(index) => PathSegment::Index(index),
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_owned()),
        });

        current = node.parent;
    }

    path.reverse();
    path
}

fn is_child(path: &[PathSegment], parent: &[PathSegment]) -> bool {
    path.len() == parent.len() + 1 && path.starts_with(parent)
}
