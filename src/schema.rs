//! Declarative schema: property paths to searchable types
//!
//! A [`Schema`] is a tree the caller builds once, up front. Walking it
//! depth-first produces the flat, dotted-path view the rest of this crate
//! operates on (`searchableProperties` / `searchablePropertiesWithTypes` in
//! the facade contract).

use crate::error::{FacetError, Result};
use serde::{Deserialize, Serialize};

/// The closed set of types a property path can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchableType {
    String,
    StringArray,
    Number,
    NumberArray,
    Boolean,
    BooleanArray,
    Enum,
    EnumArray,
    GeoPoint,
    /// Fixed-width dense vector of dimension `N` (`N >= 1`).
    Vector(usize),
}

impl SearchableType {
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            SearchableType::StringArray
                | SearchableType::NumberArray
                | SearchableType::BooleanArray
                | SearchableType::EnumArray
        )
    }
}

/// One field of a [`Schema`]: either a leaf (an indexed, searchable value)
/// or a nested object schema, which recursively contributes `.`-joined
/// paths when the schema is walked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SchemaField {
    Leaf(SearchableType),
    Object(Schema),
}

/// A declarative schema mapping property names to searchable types.
/// Insertion order is preserved — it becomes the order of
/// `searchableProperties` after a walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema(pub Vec<(String, SchemaField)>);

impl Schema {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_field(mut self, name: impl Into<String>, field: impl Into<SchemaField>) -> Self {
        self.0.push((name.into(), field.into()));
        self
    }

    /// Depth-first walk producing `(dotted_path, type)` pairs in the order
    /// they appear in the schema (nested objects' fields appear immediately
    /// after the object's own prefix is established).
    pub fn walk(&self) -> Result<Vec<(String, SearchableType)>> {
        let mut out = Vec::new();
        walk_into(&self.0, None, &mut out)?;
        Ok(out)
    }
}

impl From<SearchableType> for SchemaField {
    fn from(t: SearchableType) -> Self {
        SchemaField::Leaf(t)
    }
}

impl From<Schema> for SchemaField {
    fn from(s: Schema) -> Self {
        SchemaField::Object(s)
    }
}

fn walk_into(
    fields: &[(String, SchemaField)],
    prefix: Option<&str>,
    out: &mut Vec<(String, SearchableType)>,
) -> Result<()> {
    for (name, field) in fields {
        let path = match prefix {
            Some(p) => format!("{p}.{name}"),
            None => name.clone(),
        };
        match field {
            SchemaField::Leaf(SearchableType::Vector(0)) => {
                return Err(FacetError::InvalidSchemaType {
                    property: path,
                    reason: "vector dimension must be >= 1".into(),
                });
            }
            SchemaField::Leaf(t) => out.push((path, *t)),
            SchemaField::Object(nested) => walk_into(&nested.0, Some(&path), out)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_schema_preserves_order() {
        let schema = Schema::new()
            .with_field("title", SearchableType::String)
            .with_field("age", SearchableType::Number);

        let walked = schema.walk().unwrap();
        assert_eq!(
            walked,
            vec![
                ("title".to_string(), SearchableType::String),
                ("age".to_string(), SearchableType::Number),
            ]
        );
    }

    #[test]
    fn nested_object_contributes_dotted_paths() {
        let address = Schema::new()
            .with_field("city", SearchableType::String)
            .with_field("zip", SearchableType::Number);

        let schema = Schema::new()
            .with_field("name", SearchableType::String)
            .with_field("address", address);

        let walked = schema.walk().unwrap();
        assert_eq!(
            walked,
            vec![
                ("name".to_string(), SearchableType::String),
                ("address.city".to_string(), SearchableType::String),
                ("address.zip".to_string(), SearchableType::Number),
            ]
        );
    }

    #[test]
    fn zero_dimension_vector_is_rejected() {
        let schema = Schema::new().with_field("embedding", SearchableType::Vector(0));
        let err = schema.walk().unwrap_err();
        assert_eq!(err.code(), "INVALID_SCHEMA_TYPE");
    }
}
