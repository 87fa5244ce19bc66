//! Field resolution against the mocks of the current request.
//!
//! For every field, the explicit mock (from the parent object or the root
//! type mock) wins over the mock of the field type, which wins over a
//! generated default.

mod defaults;
mod errors;

use std::sync::Arc;

use async_graphql::{
    dynamic::{FieldValue, ResolverContext},
    Name, Value,
};
use async_graphql_parser::types::{BaseType, Type};

pub(crate) use self::errors::NullPropagation;
use crate::{
    mock::{Arguments, FieldMocks, Mock, MockError, MockLayer, Realized},
    schema::{TypeIndex, TypeShape},
};

/// A field as declared in the schema.
#[derive(Debug)]
pub(crate) struct FieldPlan {
    parent_type: String,
    name: String,
    ty: Type,
}

impl FieldPlan {
    pub(crate) fn new(parent_type: &str, name: &str, ty: Type) -> Self {
        Self {
            parent_type: parent_type.to_owned(),
            name: name.to_owned(),
            ty,
        }
    }
}

/// The value of a composite field, handed to the resolvers of its own fields.
struct MockedObject {
    fields: FieldMocks,
}

pub(crate) struct MockResolver {
    index: Arc<TypeIndex>,
    list_length: usize,
}

impl MockResolver {
    pub(crate) fn new(index: Arc<TypeIndex>, list_length: usize) -> Self {
        Self { index, list_length }
    }

    pub(crate) fn resolve<'a>(
        &self,
        plan: &FieldPlan,
        ctx: &ResolverContext<'a>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let mocks = ctx.data::<Arc<MockLayer>>()?;
        let path = ctx.path_node.as_ref().map(ToString::to_string).unwrap_or_default();
        let arguments = arguments(ctx)?;

        let resolution = Resolution {
            resolver: self,
            mocks,
            arguments: &arguments,
        };

        resolution.field(plan, ctx, &path).map_err(|error| {
            tracing::debug!(path = %path, error = %error.message, "mock resolution failed");
            error
        })
    }
}

fn arguments(ctx: &ResolverContext<'_>) -> async_graphql::Result<Arguments> {
    let mut arguments = Arguments::new();

    for (name, value) in ctx.args.as_index_map() {
        arguments.insert(name.to_string(), value.clone().into_json()?);
    }

    Ok(arguments)
}

/// The state of one field resolution.
struct Resolution<'r> {
    resolver: &'r MockResolver,
    mocks: &'r MockLayer,
    arguments: &'r Arguments,
}

impl Resolution<'_> {
    fn field<'a>(
        &self,
        plan: &FieldPlan,
        ctx: &ResolverContext<'a>,
        path: &str,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let explicit = match ctx.parent_value.try_downcast_ref::<MockedObject>() {
            Ok(parent) => parent.fields.get(&plan.name).cloned(),
            // Root fields have no parent value.
            Err(_) => self.type_field(&plan.parent_type, &plan.name)?,
        };

        let explicit = match explicit {
            Some(mock) => Some(mock.realize(self.arguments)?),
            None => None,
        };

        self.output(&plan.ty, explicit, path)
    }

    fn output<'a>(
        &self,
        ty: &Type,
        explicit: Option<Realized>,
        path: &str,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        match &ty.base {
            BaseType::List(item) => {
                let items = match explicit {
                    Some(Realized::Value(serde_json::Value::Null)) => return Ok(None),
                    Some(Realized::Value(serde_json::Value::Array(values))) => values
                        .into_iter()
                        .enumerate()
                        .map(|(index, value)| self.list_item(item, Some(Realized::Value(value)), path, index))
                        .collect::<async_graphql::Result<Vec<_>>>()?,
                    Some(other) => {
                        return Err(async_graphql::Error::new(format!(
                            "expected a list to mock {ty}, got {}",
                            describe(&other)
                        )))
                    }
                    None => (0..self.resolver.list_length)
                        .map(|index| self.list_item(item, None, path, index))
                        .collect::<async_graphql::Result<Vec<_>>>()?,
                };

                Ok(Some(FieldValue::list(items)))
            }
            BaseType::Named(name) => self.named(name.as_str(), explicit, path),
        }
    }

    fn named<'a>(
        &self,
        name: &str,
        explicit: Option<Realized>,
        path: &str,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let Some(shape) = self.resolver.index.get(name) else {
            return Err(async_graphql::Error::new(format!("unknown type {name}")));
        };

        match shape {
            TypeShape::Scalar | TypeShape::Enum(_) => self.leaf(name, shape, explicit, path),
            TypeShape::Object => self.object(name, explicit),
            TypeShape::Abstract(possible_types) => self.abstract_object(name, possible_types, explicit),
            TypeShape::Input => Err(async_graphql::Error::new(format!(
                "input type {name} cannot be a field type"
            ))),
        }
    }

    fn leaf<'a>(
        &self,
        name: &str,
        shape: &TypeShape,
        explicit: Option<Realized>,
        path: &str,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let value = match explicit {
            Some(realized) => leaf_value(name, realized)?,
            None => match self.mocks.get(name) {
                Some(mock) => leaf_value(name, mock.realize(self.arguments)?)?,
                None => defaults::generate(name, shape, path),
            },
        };

        match (value, shape) {
            (serde_json::Value::Null, _) => Ok(None),
            (serde_json::Value::String(value), TypeShape::Enum(_)) => {
                Ok(Some(FieldValue::value(Value::Enum(Name::new(value)))))
            }
            (value, _) => {
                let value = coerce_builtin_scalar(name, value)?;
                Ok(Some(FieldValue::value(Value::from_json(value)?)))
            }
        }
    }

    fn object<'a>(&self, name: &str, explicit: Option<Realized>) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let Some(explicit) = explicit_fields(name, explicit)? else {
            return Ok(None);
        };

        let mut fields = self.type_fields(name)?;
        fields.extend(explicit);

        Ok(Some(FieldValue::owned_any(MockedObject { fields })))
    }

    fn abstract_object<'a>(
        &self,
        name: &str,
        possible_types: &[String],
        explicit: Option<Realized>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let Some(explicit) = explicit_fields(name, explicit)? else {
            return Ok(None);
        };

        let mut fields = self.type_fields(name)?;

        let concrete = [&explicit, &fields]
            .into_iter()
            .find_map(|fields| typename(fields, possible_types))
            .or_else(|| possible_types.first().cloned())
            .ok_or_else(|| async_graphql::Error::new(format!("{name} has no possible types to mock")))?;

        fields.extend(self.type_fields(&concrete)?);
        fields.extend(explicit);

        Ok(Some(FieldValue::owned_any(MockedObject { fields }).with_type(concrete)))
    }

    fn list_item<'a>(
        &self,
        item_type: &Type,
        item: Option<Realized>,
        path: &str,
        index: usize,
    ) -> async_graphql::Result<FieldValue<'a>> {
        self.output(item_type, item, &format!("{path}.{index}"))
            .map(|value| value.unwrap_or(FieldValue::NULL))
    }

    /// The mock the type mock of `type_name` provides for `field_name`.
    fn type_field(&self, type_name: &str, field_name: &str) -> Result<Option<Mock>, MockError> {
        let field = match self.mocks.get(type_name) {
            None => None,
            Some(Mock::Fields(fields)) => fields.get(field_name).cloned(),
            Some(Mock::Value(value)) => value.get(field_name).cloned().map(Mock::Value),
            Some(producer @ Mock::Producer(_)) => match producer.realize(&Arguments::new())? {
                Realized::Fields(mut fields) => fields.shift_remove(field_name),
                Realized::Value(value) => value.get(field_name).cloned().map(Mock::Value),
            },
        };

        Ok(field)
    }

    /// The fields the type mock of `type_name` provides, realized without
    /// arguments.
    fn type_fields(&self, type_name: &str) -> Result<FieldMocks, MockError> {
        let Some(mock) = self.mocks.get(type_name) else {
            return Ok(FieldMocks::new());
        };

        let fields = match mock.realize(&Arguments::new())? {
            Realized::Fields(fields) => fields,
            Realized::Value(serde_json::Value::Object(object)) => object
                .into_iter()
                .map(|(name, value)| (name, Mock::Value(value)))
                .collect(),
            Realized::Value(_) => FieldMocks::new(),
        };

        Ok(fields)
    }
}

fn leaf_value(name: &str, realized: Realized) -> async_graphql::Result<serde_json::Value> {
    match realized {
        Realized::Value(value) => Ok(value),
        Realized::Fields(_) => Err(async_graphql::Error::new(format!(
            "a resolver map cannot mock the leaf type {name}"
        ))),
    }
}

/// Custom scalars take any value. IDs given as integers are rendered as
/// strings.
fn coerce_builtin_scalar(name: &str, value: serde_json::Value) -> async_graphql::Result<serde_json::Value> {
    use serde_json::Value as Json;

    let valid = match (name, &value) {
        ("ID", Json::Number(number)) if number.is_i64() || number.is_u64() => {
            return Ok(Json::String(number.to_string()))
        }
        ("ID" | "String", Json::String(_)) | ("Boolean", Json::Bool(_)) | ("Float", Json::Number(_)) => true,
        ("Int", Json::Number(number)) => number.as_i64().is_some_and(|int| i32::try_from(int).is_ok()),
        ("ID" | "String" | "Boolean" | "Float" | "Int", _) => false,
        _ => true,
    };

    if valid {
        Ok(value)
    } else {
        Err(async_graphql::Error::new(format!("{value} is not a valid mock for {name}")))
    }
}

/// `None` for an explicit null.
fn explicit_fields(name: &str, explicit: Option<Realized>) -> async_graphql::Result<Option<FieldMocks>> {
    match explicit {
        None => Ok(Some(FieldMocks::new())),
        Some(Realized::Fields(fields)) => Ok(Some(fields)),
        Some(Realized::Value(serde_json::Value::Null)) => Ok(None),
        Some(Realized::Value(serde_json::Value::Object(object))) => Ok(Some(
            object
                .into_iter()
                .map(|(name, value)| (name, Mock::Value(value)))
                .collect(),
        )),
        Some(other) => Err(async_graphql::Error::new(format!(
            "expected an object to mock {name}, got {}",
            describe(&other)
        ))),
    }
}

fn typename(fields: &FieldMocks, possible_types: &[String]) -> Option<String> {
    match fields.get("__typename")?.realize(&Arguments::new()).ok()? {
        Realized::Value(serde_json::Value::String(name)) if possible_types.contains(&name) => Some(name),
        _ => None,
    }
}

fn describe(realized: &Realized) -> String {
    match realized {
        Realized::Value(value) => value.to_string(),
        Realized::Fields(_) => "a resolver map".to_owned(),
    }
}
