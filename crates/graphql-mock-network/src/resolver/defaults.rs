//! Deterministic placeholders for fields nobody mocked.
//!
//! A value only depends on the type name and the response path of the field,
//! so the same query against the same mocks always gets the same response.

use std::hash::Hasher;

use fnv::FnvHasher;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::schema::TypeShape;

pub(crate) const DEFAULT_STRING: &str = "Hello World";

pub(crate) fn generate(type_name: &str, shape: &TypeShape, path: &str) -> Value {
    let seed = seed(type_name, path);

    if let TypeShape::Enum(values) = shape {
        return values.first().map(|value| json!(value)).unwrap_or(Value::Null);
    }

    match type_name {
        "Int" => json!((seed % 201) as i64 - 100),
        "Float" => json!(((seed % 20_001) as f64 - 10_000.0) / 100.0),
        "Boolean" => json!(seed % 2 == 0),
        "ID" => json!(Uuid::from_u64_pair(seed, seed.rotate_left(29) ^ 0x9e37_79b9_7f4a_7c15).to_string()),
        _ => json!(DEFAULT_STRING),
    }
}

fn seed(type_name: &str, path: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(type_name.as_bytes());
    hasher.write_u8(0);
    hasher.write(path.as_bytes());
    hasher.finish()
}
