use std::collections::HashMap;

use async_graphql_parser::types::TypeKind;

use super::TypeGroup;

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub(crate) fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// What the resolver needs to know about a named type.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeShape {
    Scalar,
    Enum(Vec<String>),
    Object,
    /// Interfaces and unions, with their possible types in declaration order.
    Abstract(Vec<String>),
    Input,
}

#[derive(Debug, Default)]
pub(crate) struct TypeIndex {
    types: HashMap<String, TypeShape>,
}

impl TypeIndex {
    pub(crate) fn new(groups: &[TypeGroup<'_>]) -> Self {
        let mut types: HashMap<String, TypeShape> = BUILTIN_SCALARS
            .into_iter()
            .map(|name| (name.to_owned(), TypeShape::Scalar))
            .collect();

        for group in groups {
            let shape = match group.kind() {
                TypeKind::Scalar => TypeShape::Scalar,
                TypeKind::Object(_) => TypeShape::Object,
                TypeKind::Interface(_) => TypeShape::Abstract(Vec::new()),
                TypeKind::Union(_) => TypeShape::Abstract(
                    group
                        .unions()
                        .flat_map(|union| union.members.iter())
                        .map(|member| member.node.to_string())
                        .collect(),
                ),
                TypeKind::Enum(_) => TypeShape::Enum(
                    group
                        .enums()
                        .flat_map(|enum_| enum_.values.iter())
                        .map(|value| value.node.value.node.to_string())
                        .collect(),
                ),
                TypeKind::InputObject(_) => TypeShape::Input,
            };

            types.insert(group.name.to_owned(), shape);
        }

        for group in groups {
            if !matches!(group.kind(), TypeKind::Object(_)) {
                continue;
            }

            for interface in group.objects().flat_map(|object| object.implements.iter()) {
                if let Some(TypeShape::Abstract(possible)) = types.get_mut(interface.node.as_str()) {
                    if !possible.iter().any(|name| name == group.name) {
                        possible.push(group.name.to_owned());
                    }
                }
            }
        }

        Self { types }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&TypeShape> {
        self.types.get(name)
    }
}
