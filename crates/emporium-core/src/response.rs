//! Response shaping.
//!
//! A handler's reply is first reshaped by its endpoint's [`ResponseModel`]
//! (validated against the response schema, which drops undeclared fields
//! and fills defaults) and then filtered by a [`Projection`]. Any failure
//! here is a server fault: the handler produced data its own declaration
//! does not describe.

use std::collections::HashSet;

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::schema::{FieldType, Schema};

/// Field filter applied to an outgoing object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every field is kept.
    #[default]
    None,
    /// Only the listed fields are kept.
    Include(HashSet<String>),
    /// The listed fields are removed.
    Exclude(HashSet<String>),
}

impl Projection {
    /// Keeps only `fields`.
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(fields.into_iter().map(Into::into).collect())
    }

    /// Drops `fields`.
    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(fields.into_iter().map(Into::into).collect())
    }

    fn keeps(&self, key: &str) -> bool {
        match self {
            Self::None => true,
            Self::Include(set) => set.contains(key),
            Self::Exclude(set) => !set.contains(key),
        }
    }
}

/// Applies `projection` to a copy of `value`.
///
/// Objects keep their existing key order. Lists are projected element-wise
/// and scalars are returned unchanged.
///
/// ```
/// use emporium_core::response::{project, Projection};
/// use serde_json::json;
///
/// let item = json!({"name": "Bar", "description": "The Bar fighters", "price": 62.0});
/// let out = project(&item, &Projection::include(["name", "description"]));
/// assert_eq!(out, json!({"name": "Bar", "description": "The Bar fighters"}));
/// ```
#[must_use]
pub fn project(value: &Value, projection: &Projection) -> Value {
    match (value, projection) {
        (_, Projection::None) => value.clone(),
        (Value::Object(map), _) => Value::Object(
            map.iter()
                .filter(|(k, _)| projection.keeps(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        (Value::Array(items), _) => {
            Value::Array(items.iter().map(|v| project(v, projection)).collect())
        }
        _ => value.clone(),
    }
}

/// Union of record schemas told apart by a literal discriminant field.
#[derive(Debug, Clone)]
pub struct DiscriminatedUnion {
    discriminant: String,
    variants: Vec<&'static Schema>,
}

impl DiscriminatedUnion {
    /// Creates a union over `variants`, tried in the given order.
    ///
    /// Each variant must declare `discriminant` as a
    /// [`FieldType::Literal`].
    pub fn new(discriminant: impl Into<String>, variants: Vec<&'static Schema>) -> Self {
        Self {
            discriminant: discriminant.into(),
            variants,
        }
    }

    /// Returns the discriminant field name.
    #[must_use]
    pub fn discriminant(&self) -> &str {
        &self.discriminant
    }

    /// Returns the variants in declaration order.
    #[must_use]
    pub fn variants(&self) -> &[&'static Schema] {
        &self.variants
    }

    /// Picks the variant for `record`.
    pub fn select(&self, record: &Value) -> Result<&'static Schema, ApiError> {
        select_variant(record, &self.discriminant, &self.variants)
    }
}

/// Returns the fixed discriminant value a variant declares, if any.
#[must_use]
pub fn variant_tag<'a>(schema: &'a Schema, discriminant: &str) -> Option<&'a str> {
    match schema.get_field(discriminant)?.ty() {
        FieldType::Literal(tag) => Some(tag),
        _ => None,
    }
}

/// Selects the first variant whose fixed discriminant equals the record's.
///
/// A record whose discriminant matches no variant means the fixture data and
/// the declared union disagree, which is a server fault.
pub fn select_variant(
    record: &Value,
    discriminant: &str,
    variants: &[&'static Schema],
) -> Result<&'static Schema, ApiError> {
    let tag = record.get(discriminant).and_then(Value::as_str);
    variants
        .iter()
        .copied()
        .find(|schema| tag.is_some() && variant_tag(schema, discriminant) == tag)
        .ok_or_else(|| {
            ApiError::internal(format!(
                "no variant of [{}] matches {discriminant}={}",
                variants
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", "),
                tag.unwrap_or("<absent>")
            ))
        })
}

/// Response schema of an endpoint.
#[derive(Debug, Clone)]
pub enum ResponseModel {
    /// A single record.
    Schema(&'static Schema),
    /// A list of records of the inner model.
    List(Box<ResponseModel>),
    /// One of several records chosen by discriminant.
    Union(DiscriminatedUnion),
}

impl ResponseModel {
    /// Shorthand for a list of `schema` records.
    #[must_use]
    pub fn list_of(schema: &'static Schema) -> Self {
        Self::List(Box::new(Self::Schema(schema)))
    }

    /// Reshapes a handler reply to this model.
    pub fn shape(&self, value: &Value) -> Result<Value, ApiError> {
        match self {
            Self::Schema(schema) => schema.validate(value).map_err(|errors| {
                ApiError::internal(format!(
                    "response does not fit {}: {}",
                    schema.name(),
                    errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; ")
                ))
            }),
            Self::List(inner) => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|v| inner.shape(v))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(ApiError::internal("response should be a list")),
            },
            Self::Union(union) => Self::Schema(union.select(value)?).shape(value),
        }
    }

    /// Renders the JSON Schema fragment for this model.
    #[must_use]
    pub fn describe(&self) -> Value {
        match self {
            Self::Schema(schema) => FieldType::Model(schema).describe(),
            Self::List(inner) => json!({"type": "array", "items": inner.describe()}),
            Self::Union(union) => {
                let one_of: Vec<Value> = union
                    .variants
                    .iter()
                    .map(|s| FieldType::Model(s).describe())
                    .collect();
                json!({
                    "oneOf": one_of,
                    "discriminator": {"propertyName": union.discriminant}
                })
            }
        }
    }

    /// Returns every schema this model references, nested ones included.
    #[must_use]
    pub fn schemas(&self) -> Vec<&'static Schema> {
        let mut found = Vec::new();
        self.collect(&mut found);
        found
    }

    fn collect(&self, found: &mut Vec<&'static Schema>) {
        match self {
            Self::Schema(schema) => crate::schema::collect_models(&FieldType::Model(schema), found),
            Self::List(inner) => inner.collect(found),
            Self::Union(union) => {
                for schema in &union.variants {
                    crate::schema::collect_models(&FieldType::Model(schema), found);
                }
            }
        }
    }
}
