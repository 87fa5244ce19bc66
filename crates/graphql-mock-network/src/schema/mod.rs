//! Executable mock schemas built from SDL or introspection results.

mod index;
mod source;

use std::{fmt, path::Path, sync::Arc};

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField, Object, Scalar,
    SchemaBuilder, TypeRef, Union,
};
use async_graphql_parser::types::{
    BaseType, EnumType, FieldDefinition, InputObjectType, InputValueDefinition, InterfaceType, ObjectType,
    ServiceDocument, Type, TypeDefinition, TypeKind, TypeSystemDefinition, UnionType,
};
use indexmap::IndexMap;

pub(crate) use self::index::{TypeIndex, TypeShape};
use self::source::SchemaSource;
use crate::{
    error::{Error, Result},
    resolver::{FieldPlan, MockResolver, NullPropagation},
};

/// Number of items generated for a list field nobody mocked.
pub const DEFAULT_LIST_LENGTH: usize = 2;

/// An executable schema answering every field with a mock.
///
/// Built once and never modified. Cloning is cheap.
#[derive(Clone)]
pub struct MockSchema {
    schema: async_graphql::dynamic::Schema,
    sdl: Arc<str>,
}

impl MockSchema {
    /// Detects whether `source` is SDL or an introspection result.
    pub fn from_source(source: impl AsRef<str>) -> Result<Self> {
        Self::builder(source).build()
    }

    pub fn from_sdl(sdl: impl Into<String>) -> Result<Self> {
        MockSchemaBuilder::new(SchemaSource::Sdl(sdl.into())).build()
    }

    /// Accepts `{"data": {"__schema": ...}}` as well as `{"__schema": ...}`.
    pub fn from_introspection(introspection: serde_json::Value) -> Result<Self> {
        MockSchemaBuilder::new(SchemaSource::Introspection(introspection)).build()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_source(read_schema_file(path.as_ref())?)
    }

    pub fn builder(source: impl AsRef<str>) -> MockSchemaBuilder {
        MockSchemaBuilder::new(SchemaSource::detect(source.as_ref()))
    }

    /// The SDL the schema was built from. For introspection results, the SDL
    /// rendered from them.
    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    pub(crate) async fn execute(&self, request: async_graphql::Request) -> async_graphql::Response {
        self.schema.execute(request).await
    }
}

impl fmt::Debug for MockSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSchema").field("sdl", &self.sdl).finish_non_exhaustive()
    }
}

pub(crate) fn read_schema_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::SchemaFile {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct MockSchemaBuilder {
    source: SchemaSource,
    list_length: usize,
}

impl MockSchemaBuilder {
    fn new(source: SchemaSource) -> Self {
        Self {
            source,
            list_length: DEFAULT_LIST_LENGTH,
        }
    }

    /// How many items to generate for unmocked list fields.
    pub fn list_length(mut self, list_length: usize) -> Self {
        self.list_length = list_length;
        self
    }

    pub fn build(self) -> Result<MockSchema> {
        let (sdl, document) = self.source.parse()?;
        let groups = group_types(&document)?;

        let index = Arc::new(TypeIndex::new(&groups));
        let (query, mutation) = root_types(&document, &index);
        let resolver = Arc::new(MockResolver::new(index, self.list_length));

        let mut builder = async_graphql::dynamic::Schema::build(&query, mutation.as_deref(), None::<&str>)
            .extension(NullPropagation);

        for group in &groups {
            builder = register(builder, group, &resolver);
        }

        let schema = builder.finish().map_err(|err| Error::SchemaBuild(err.to_string()))?;

        Ok(MockSchema { schema, sdl: sdl.into() })
    }
}

/// All definitions of one named type: the type itself and its extensions.
#[derive(Debug)]
pub(crate) struct TypeGroup<'a> {
    pub(crate) name: &'a str,
    definitions: Vec<&'a TypeDefinition>,
}

impl<'a> TypeGroup<'a> {
    /// The kind of the definition proper, or of the first extension for types
    /// that are only extended.
    pub(crate) fn kind(&self) -> &'a TypeKind {
        let definition = self
            .definitions
            .iter()
            .copied()
            .find(|definition| !definition.extend)
            .unwrap_or(self.definitions[0]);

        &definition.kind
    }

    fn description(&self) -> Option<&'a str> {
        self.definitions
            .iter()
            .copied()
            .find_map(|definition| definition.description.as_ref())
            .map(|description| description.node.as_str())
    }

    pub(crate) fn objects(&self) -> impl Iterator<Item = &'a ObjectType> + '_ {
        self.definitions.iter().copied().filter_map(|definition| match &definition.kind {
            TypeKind::Object(object) => Some(object),
            _ => None,
        })
    }

    fn interfaces(&self) -> impl Iterator<Item = &'a InterfaceType> + '_ {
        self.definitions.iter().copied().filter_map(|definition| match &definition.kind {
            TypeKind::Interface(interface) => Some(interface),
            _ => None,
        })
    }

    pub(crate) fn unions(&self) -> impl Iterator<Item = &'a UnionType> + '_ {
        self.definitions.iter().copied().filter_map(|definition| match &definition.kind {
            TypeKind::Union(union) => Some(union),
            _ => None,
        })
    }

    pub(crate) fn enums(&self) -> impl Iterator<Item = &'a EnumType> + '_ {
        self.definitions.iter().copied().filter_map(|definition| match &definition.kind {
            TypeKind::Enum(enum_) => Some(enum_),
            _ => None,
        })
    }

    fn input_objects(&self) -> impl Iterator<Item = &'a InputObjectType> + '_ {
        self.definitions.iter().copied().filter_map(|definition| match &definition.kind {
            TypeKind::InputObject(input) => Some(input),
            _ => None,
        })
    }
}

/// Groups type definitions and extensions by name, in order of first
/// appearance.
pub(crate) fn group_types(document: &ServiceDocument) -> Result<Vec<TypeGroup<'_>>> {
    let mut groups: IndexMap<&str, TypeGroup<'_>> = IndexMap::new();

    for definition in &document.definitions {
        let TypeSystemDefinition::Type(definition) = definition else {
            continue;
        };

        let definition = &definition.node;
        let name = definition.name.node.as_str();

        // Introspection types are provided by the executor.
        if name.starts_with("__") {
            continue;
        }

        let group = groups.entry(name).or_insert_with(|| TypeGroup {
            name,
            definitions: Vec::new(),
        });

        if let Some(first) = group.definitions.first() {
            if std::mem::discriminant(&first.kind) != std::mem::discriminant(&definition.kind) {
                return Err(Error::SchemaBuild(format!(
                    "type {name} is extended as a different kind of type"
                )));
            }
        }

        group.definitions.push(definition);
    }

    Ok(groups.into_values().collect())
}

fn root_types(document: &ServiceDocument, index: &TypeIndex) -> (String, Option<String>) {
    let mut query = None;
    let mut mutation = None;

    for definition in &document.definitions {
        let TypeSystemDefinition::Schema(schema) = definition else {
            continue;
        };

        if let Some(name) = &schema.node.query {
            query = Some(name.node.to_string());
        }

        if let Some(name) = &schema.node.mutation {
            mutation = Some(name.node.to_string());
        }
    }

    let query = query.unwrap_or_else(|| "Query".to_owned());
    let mutation = mutation.or_else(|| index.get("Mutation").map(|_| "Mutation".to_owned()));

    (query, mutation)
}

fn register(builder: SchemaBuilder, group: &TypeGroup<'_>, resolver: &Arc<MockResolver>) -> SchemaBuilder {
    let name = group.name;
    let description = group.description();

    match group.kind() {
        TypeKind::Scalar => {
            if index::is_builtin_scalar(name) {
                return builder;
            }

            let mut scalar = Scalar::new(name);
            if let Some(description) = description {
                scalar = scalar.description(description);
            }

            builder.register(scalar)
        }
        TypeKind::Object(_) => {
            let mut object = Object::new(name);
            if let Some(description) = description {
                object = object.description(description);
            }

            for interface in group.objects().flat_map(|object| object.implements.iter()) {
                object = object.implement(interface.node.as_str());
            }

            for field in group.objects().flat_map(|object| object.fields.iter()) {
                object = object.field(mock_field(name, &field.node, resolver));
            }

            builder.register(object)
        }
        TypeKind::Interface(_) => {
            let mut interface = Interface::new(name);
            if let Some(description) = description {
                interface = interface.description(description);
            }

            for implemented in group.interfaces().flat_map(|interface| interface.implements.iter()) {
                interface = interface.implement(implemented.node.as_str());
            }

            for definition in group.interfaces().flat_map(|interface| interface.fields.iter()) {
                let definition = &definition.node;
                let mut field = InterfaceField::new(definition.name.node.as_str(), type_ref(&definition.ty.node));

                if let Some(description) = &definition.description {
                    field = field.description(description.node.as_str());
                }

                for argument in &definition.arguments {
                    field = field.argument(input_value(&argument.node));
                }

                interface = interface.field(field);
            }

            builder.register(interface)
        }
        TypeKind::Union(_) => {
            let mut union = Union::new(name);
            if let Some(description) = description {
                union = union.description(description);
            }

            for member in group.unions().flat_map(|union| union.members.iter()) {
                union = union.possible_type(member.node.as_str());
            }

            builder.register(union)
        }
        TypeKind::Enum(_) => {
            let mut enum_ = Enum::new(name);
            if let Some(description) = description {
                enum_ = enum_.description(description);
            }

            for value in group.enums().flat_map(|enum_| enum_.values.iter()) {
                let mut item = EnumItem::new(value.node.value.node.as_str());
                if let Some(description) = &value.node.description {
                    item = item.description(description.node.as_str());
                }

                enum_ = enum_.item(item);
            }

            builder.register(enum_)
        }
        TypeKind::InputObject(_) => {
            let mut input = InputObject::new(name);
            if let Some(description) = description {
                input = input.description(description);
            }

            for field in group.input_objects().flat_map(|input| input.fields.iter()) {
                input = input.field(input_value(&field.node));
            }

            builder.register(input)
        }
    }
}

fn mock_field(parent_type: &str, definition: &FieldDefinition, resolver: &Arc<MockResolver>) -> Field {
    let plan = Arc::new(FieldPlan::new(
        parent_type,
        definition.name.node.as_str(),
        definition.ty.node.clone(),
    ));
    let resolver = resolver.clone();

    let mut field = Field::new(
        definition.name.node.as_str(),
        type_ref(&definition.ty.node),
        move |ctx| {
            let result = resolver.resolve(&plan, &ctx);
            FieldFuture::new(async move { result })
        },
    );

    if let Some(description) = &definition.description {
        field = field.description(description.node.as_str());
    }

    for argument in &definition.arguments {
        field = field.argument(input_value(&argument.node));
    }

    field
}

fn input_value(definition: &InputValueDefinition) -> InputValue {
    let mut input = InputValue::new(definition.name.node.as_str(), type_ref(&definition.ty.node));

    if let Some(description) = &definition.description {
        input = input.description(description.node.as_str());
    }

    if let Some(default_value) = &definition.default_value {
        input = input.default_value(default_value.node.clone());
    }

    input
}

fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::named(name.as_str()),
        BaseType::List(item) => TypeRef::List(Box::new(type_ref(item))),
    };

    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}
