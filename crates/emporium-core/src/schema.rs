//! Declarative record schemas.
//!
//! A [`Schema`] is an ordered list of [`FieldSpec`]s. Each field declares its
//! semantic [`FieldType`], whether it is required, an optional default, and
//! any number of [`Constraint`]s. The same records drive validation
//! ([`Schema::validate`]), documentation ([`Schema::describe`]) and response
//! shaping.
//!
//! # Example
//!
//! ```
//! use emporium_core::schema::{FieldSpec, FieldType, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new("Image")
//!     .field(FieldSpec::new("url", FieldType::Url))
//!     .field(FieldSpec::new("name", FieldType::String));
//!
//! let value = schema
//!     .validate(&json!({"url": "https://example.com/a.png", "name": "A"}))
//!     .unwrap();
//! assert_eq!(value["name"], "A");
//! ```

use std::fmt;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::{FieldError, FieldErrors};

/// Errors raised while declaring a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A pattern constraint did not compile.
    #[error("invalid pattern '{pattern}' on field '{field}': {source}")]
    InvalidPattern {
        /// Field the pattern was declared on.
        field: String,
        /// The offending pattern.
        pattern: String,
        /// Compiler error.
        #[source]
        source: regex::Error,
    },
}

/// Semantic type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Text.
    String,
    /// Signed integer.
    Integer,
    /// Finite floating point number.
    Float,
    /// Boolean.
    Boolean,
    /// UUID in any textual form; emitted hyphenated.
    Uuid,
    /// Absolute `http` or `https` URL.
    Url,
    /// Email address.
    Email,
    /// Closed set of string values.
    Enum(Vec<String>),
    /// A single fixed string, used for union discriminants.
    Literal(String),
    /// Ordered sequence.
    List(Box<FieldType>),
    /// Sequence with duplicates removed.
    Set(Box<FieldType>),
    /// String-keyed map.
    Map(Box<FieldType>),
    /// Nested record.
    Model(&'static Schema),
    /// Anything, passed through unchanged.
    Any,
}

impl FieldType {
    /// Creates an enum type from its members.
    pub fn enumeration<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(members.into_iter().map(Into::into).collect())
    }

    /// Creates a literal type.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a list type.
    #[must_use]
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Creates a set type.
    #[must_use]
    pub fn set(inner: FieldType) -> Self {
        Self::Set(Box::new(inner))
    }

    /// Creates a map type.
    #[must_use]
    pub fn map(inner: FieldType) -> Self {
        Self::Map(Box::new(inner))
    }

    /// Returns true for list and set types.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_))
    }

    /// Renders the JSON Schema fragment for this type.
    #[must_use]
    pub fn describe(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Float => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Uuid => json!({"type": "string", "format": "uuid"}),
            Self::Url => json!({"type": "string", "format": "uri", "minLength": 1}),
            Self::Email => json!({"type": "string", "format": "email"}),
            Self::Enum(members) => json!({"type": "string", "enum": members}),
            Self::Literal(value) => json!({"const": value}),
            Self::List(inner) => json!({"type": "array", "items": inner.describe()}),
            Self::Set(inner) => {
                json!({"type": "array", "uniqueItems": true, "items": inner.describe()})
            }
            Self::Map(inner) => json!({"type": "object", "additionalProperties": inner.describe()}),
            Self::Model(schema) => json!({"$ref": format!("#/components/schemas/{}", schema.name())}),
            Self::Any => json!({}),
        }
    }
}

/// A constraint evaluated after a value has been coerced to its type.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Minimum length of a string (in characters) or a sequence.
    MinLength(usize),
    /// Maximum length of a string (in characters) or a sequence.
    MaxLength(usize),
    /// Exclusive lower bound.
    Gt(f64),
    /// Inclusive lower bound.
    Ge(f64),
    /// Exclusive upper bound.
    Lt(f64),
    /// Inclusive upper bound.
    Le(f64),
    /// The string must contain a match.
    Pattern(Regex),
}

impl Constraint {
    fn describe_into(&self, target: &mut Map<String, Value>, sequence: bool) {
        let (key, value) = match self {
            Self::MinLength(n) if sequence => ("minItems", json!(n)),
            Self::MaxLength(n) if sequence => ("maxItems", json!(n)),
            Self::MinLength(n) => ("minLength", json!(n)),
            Self::MaxLength(n) => ("maxLength", json!(n)),
            Self::Gt(n) => ("exclusiveMinimum", json!(n)),
            Self::Ge(n) => ("minimum", json!(n)),
            Self::Lt(n) => ("exclusiveMaximum", json!(n)),
            Self::Le(n) => ("maximum", json!(n)),
            Self::Pattern(re) => ("pattern", json!(re.as_str())),
        };
        target.insert(key.to_string(), value);
    }
}

/// A named example payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    #[serde(skip)]
    name: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    value: Value,
}

impl Example {
    /// Creates an example.
    pub fn new(name: impl Into<String>, summary: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            description: None,
            value,
        }
    }

    /// Adds a longer description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the example key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the one-line summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the example payload.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Renders examples as an OpenAPI `examples` object.
#[must_use]
pub fn describe_examples(examples: &[Example]) -> Value {
    let map: Map<String, Value> = examples
        .iter()
        .map(|e| {
            (
                e.name.clone(),
                serde_json::to_value(e).unwrap_or(Value::Null),
            )
        })
        .collect();
    Value::Object(map)
}

/// Declaration of one field.
///
/// Fields are required unless [`optional`](Self::optional) or
/// [`default`](Self::default) is called.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    alias: Option<String>,
    ty: FieldType,
    required: bool,
    default: Option<Value>,
    constraints: Vec<Constraint>,
    title: Option<String>,
    description: Option<String>,
    examples: Vec<Example>,
}

impl FieldSpec {
    /// Creates a required field.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            ty,
            required: true,
            default: None,
            constraints: Vec::new(),
            title: None,
            description: None,
            examples: Vec::new(),
        }
    }

    /// Makes the field optional; an absent value resolves to `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Makes the field optional with a default.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    /// Reads the field under a different external name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Requires at least `n` characters or items.
    #[must_use]
    pub fn min_length(self, n: usize) -> Self {
        self.constraint(Constraint::MinLength(n))
    }

    /// Allows at most `n` characters or items.
    #[must_use]
    pub fn max_length(self, n: usize) -> Self {
        self.constraint(Constraint::MaxLength(n))
    }

    /// Requires a value strictly greater than `n`.
    #[must_use]
    pub fn gt(self, n: f64) -> Self {
        self.constraint(Constraint::Gt(n))
    }

    /// Requires a value greater than or equal to `n`.
    #[must_use]
    pub fn ge(self, n: f64) -> Self {
        self.constraint(Constraint::Ge(n))
    }

    /// Requires a value strictly less than `n`.
    #[must_use]
    pub fn lt(self, n: f64) -> Self {
        self.constraint(Constraint::Lt(n))
    }

    /// Requires a value less than or equal to `n`.
    #[must_use]
    pub fn le(self, n: f64) -> Self {
        self.constraint(Constraint::Le(n))
    }

    /// Requires a string matching `pattern`.
    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        let re = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            field: self.name.clone(),
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.constraint(Constraint::Pattern(re)))
    }

    /// Sets the documentation title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a named example.
    #[must_use]
    pub fn example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Returns the internal name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name the value is read under.
    #[must_use]
    pub fn external_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Returns the field type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Returns true if an absent value is an error.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the declared default.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the documentation title.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the documentation description.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the named examples.
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Renders the JSON Schema fragment for this field.
    #[must_use]
    pub fn describe(&self) -> Value {
        let mut out = match self.ty.describe() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let sequence = self.ty.is_sequence();
        for c in &self.constraints {
            c.describe_into(&mut out, sequence);
        }
        if let Some(title) = &self.title {
            out.insert("title".into(), json!(title));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), json!(description));
        }
        if let Some(default) = &self.default {
            out.insert("default".into(), default.clone());
        }
        Value::Object(out)
    }
}

/// A record schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
    examples: Vec<Example>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a named example payload.
    #[must_use]
    pub fn example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Finds a field by internal name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the named examples.
    #[must_use]
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Validates and coerces a raw payload.
    ///
    /// The output is an object keyed by internal field names, in declaration
    /// order, with defaults filled in and unknown keys dropped.
    pub fn validate(&self, raw: &Value) -> Result<Value, FieldErrors> {
        crate::validate::validate(self, raw)
    }

    /// Renders the schema as a JSON Schema object with its examples.
    #[must_use]
    pub fn describe(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                let mut d = f.describe();
                if let (Value::Object(map), None) = (&mut d, f.title.as_ref()) {
                    map.insert("title".into(), json!(title_case(f.external_name())));
                }
                (f.external_name().to_string(), d)
            })
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(FieldSpec::external_name)
            .collect();

        let mut out = Map::new();
        out.insert("title".into(), json!(self.name));
        out.insert("type".into(), json!("object"));
        out.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            out.insert("required".into(), json!(required));
        }
        if !self.examples.is_empty() {
            out.insert("examples".into(), describe_examples(&self.examples));
        }
        Value::Object(out)
    }

    /// Returns every schema reachable through nested model fields, this one
    /// excluded, each listed once.
    #[must_use]
    pub fn nested_schemas(&self) -> Vec<&'static Schema> {
        let mut found = Vec::new();
        for field in &self.fields {
            collect_models(&field.ty, &mut found);
        }
        found
    }
}

/// Collects every schema reachable from `ty` into `found`, skipping duplicates.
pub fn collect_models(ty: &FieldType, found: &mut Vec<&'static Schema>) {
    match ty {
        FieldType::Model(schema) => {
            if found.iter().any(|s| s.name == schema.name) {
                return;
            }
            found.push(schema);
            for field in &schema.fields {
                collect_models(&field.ty, found);
            }
        }
        FieldType::List(inner) | FieldType::Set(inner) | FieldType::Map(inner) => {
            collect_models(inner, found);
        }
        _ => {}
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn title_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A Rust type with a declared schema.
///
/// [`Model::validate`] runs the validation engine and then deserialises the
/// coerced value, so constraints the type system cannot express (bounds,
/// lengths, patterns) are still enforced.
pub trait Model: Serialize + DeserializeOwned {
    /// Returns the schema for this type.
    fn schema() -> &'static Schema;

    /// Validates a raw payload into a typed instance.
    fn validate(raw: &Value) -> Result<Self, FieldErrors> {
        let coerced = Self::schema().validate(raw)?;
        serde_json::from_value(coerced).map_err(|e| {
            FieldErrors::single(FieldError::new(
                "model_type",
                format!("Value does not fit {}: {e}", Self::schema().name()),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static IMAGE: Lazy<Schema> = Lazy::new(|| {
        Schema::new("Image")
            .field(FieldSpec::new("url", FieldType::Url).description("The url of the image"))
            .field(FieldSpec::new("name", FieldType::String))
    });

    static WRAPPER: Lazy<Schema> = Lazy::new(|| {
        Schema::new("Wrapper")
            .field(FieldSpec::new("image", FieldType::Model(&IMAGE)).optional())
            .field(FieldSpec::new("images", FieldType::list(FieldType::Model(&IMAGE))).default(json!([])))
    });

    #[test]
    fn test_field_spec_defaults() {
        let f = FieldSpec::new("name", FieldType::String);
        assert!(f.is_required());
        assert_eq!(f.external_name(), "name");

        let f = FieldSpec::new("q", FieldType::String).alias("item-query").optional();
        assert!(!f.is_required());
        assert_eq!(f.external_name(), "item-query");
        assert!(f.default_value().is_none());
    }

    #[test]
    fn test_field_spec_default_implies_optional() {
        let f = FieldSpec::new("skip", FieldType::Integer).default(json!(0));
        assert!(!f.is_required());
        assert_eq!(f.default_value(), Some(&json!(0)));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = FieldSpec::new("q", FieldType::String).pattern("(unclosed").unwrap_err();
        assert!(err.to_string().contains("'q'"));
    }

    #[test]
    fn test_field_describe_includes_constraints() {
        let f = FieldSpec::new("description", FieldType::String)
            .optional()
            .max_length(300)
            .title("The description of the item");
        let d = f.describe();
        assert_eq!(d["type"], "string");
        assert_eq!(d["maxLength"], 300);
        assert_eq!(d["title"], "The description of the item");
    }

    #[test]
    fn test_sequence_lengths_describe_as_items() {
        let f = FieldSpec::new("q", FieldType::list(FieldType::String)).min_length(1);
        assert_eq!(f.describe()["minItems"], 1);
    }

    #[test]
    fn test_schema_describe() {
        let d = IMAGE.describe();
        assert_eq!(d["title"], "Image");
        assert_eq!(d["required"], json!(["url", "name"]));
        assert_eq!(d["properties"]["url"]["format"], "uri");
        assert_eq!(d["properties"]["name"]["title"], "Name");
    }

    #[test]
    fn test_schema_describe_examples() {
        let schema = Schema::new("Thing")
            .field(FieldSpec::new("n", FieldType::Integer))
            .example(Example::new("normal", "A normal example", json!({"n": 1})).description("works"));
        let d = schema.describe();
        assert_eq!(d["examples"]["normal"]["summary"], "A normal example");
        assert_eq!(d["examples"]["normal"]["description"], "works");
        assert_eq!(d["examples"]["normal"]["value"], json!({"n": 1}));
    }

    #[test]
    fn test_nested_model_reference() {
        let d = WRAPPER.describe();
        assert_eq!(d["properties"]["image"]["$ref"], "#/components/schemas/Image");
        assert_eq!(
            d["properties"]["images"]["items"]["$ref"],
            "#/components/schemas/Image"
        );
    }

    #[test]
    fn test_nested_schemas_are_deduplicated() {
        let nested = WRAPPER.nested_schemas();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name(), "Image");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("full_name"), "Full Name");
        assert_eq!(title_case("item-query"), "Item Query");
    }

    #[test]
    fn test_model_trait_validate() {
        #[derive(Debug, Serialize, serde::Deserialize, PartialEq)]
        struct Image {
            url: String,
            name: String,
        }

        impl Model for Image {
            fn schema() -> &'static Schema {
                &IMAGE
            }
        }

        let img = Image::validate(&json!({"url": "http://example.com/x", "name": "X"})).unwrap();
        assert_eq!(img.name, "X");

        let errors = Image::validate(&json!({"url": "not a url"})).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
