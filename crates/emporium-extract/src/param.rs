//! Binding descriptors.
//!
//! A [`ParamSpec`] says where one handler input comes from and which
//! [`FieldSpec`] it must satisfy. The constructors mirror the request
//! channels: [`ParamSpec::path`], [`ParamSpec::query`],
//! [`ParamSpec::header`], [`ParamSpec::cookie`], [`ParamSpec::form`],
//! [`ParamSpec::body`] and the three file flavours.

use emporium_core::{FieldSpec, FieldType};
use serde_json::{json, Map, Value};

use crate::error::ExtractionSource;

/// How a file parameter is handed to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// The payload read fully into memory.
    Bytes,
    /// One spooled [`UploadFile`](crate::UploadFile).
    Upload,
    /// Every spooled file sent under the name, in upload order.
    UploadList,
}

/// One declared handler input.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    source: ExtractionSource,
    field: FieldSpec,
    external: String,
    embed: bool,
    file: Option<FileKind>,
}

impl ParamSpec {
    fn with_source(source: ExtractionSource, field: FieldSpec) -> Self {
        let external = field.external_name().to_string();
        Self {
            source,
            field,
            external,
            embed: false,
            file: None,
        }
    }

    /// A path template segment. Path parameters are always required.
    #[must_use]
    pub fn path(field: FieldSpec) -> Self {
        Self::with_source(ExtractionSource::Path, field)
    }

    /// A query string parameter. List types collect repeated keys.
    #[must_use]
    pub fn query(field: FieldSpec) -> Self {
        Self::with_source(ExtractionSource::Query, field)
    }

    /// A header. Without an alias, `user_agent` is read from `user-agent`.
    #[must_use]
    pub fn header(field: FieldSpec) -> Self {
        let mut spec = Self::with_source(ExtractionSource::Header, field);
        if spec.external == spec.field.name() {
            spec.external = spec.external.replace('_', "-");
        }
        spec.external.make_ascii_lowercase();
        spec
    }

    /// A cookie.
    #[must_use]
    pub fn cookie(field: FieldSpec) -> Self {
        Self::with_source(ExtractionSource::Cookie, field)
    }

    /// A form field, from a urlencoded body or a multipart text part.
    #[must_use]
    pub fn form(field: FieldSpec) -> Self {
        Self::with_source(ExtractionSource::Form, field)
    }

    /// A JSON body value.
    ///
    /// A lone body parameter consumes the whole body unless
    /// [`embed`](Self::embed) is set; with several body parameters each is
    /// read from the body object under its own name.
    #[must_use]
    pub fn body(field: FieldSpec) -> Self {
        Self::with_source(ExtractionSource::Body, field)
    }

    /// A required file read fully into memory.
    #[must_use]
    pub fn file_bytes(name: impl Into<String>) -> Self {
        Self::file(name, FileKind::Bytes)
    }

    /// A required file handed over as an [`UploadFile`](crate::UploadFile).
    #[must_use]
    pub fn upload(name: impl Into<String>) -> Self {
        Self::file(name, FileKind::Upload)
    }

    /// One or more files sent under the same name.
    #[must_use]
    pub fn uploads(name: impl Into<String>) -> Self {
        Self::file(name, FileKind::UploadList)
    }

    fn file(name: impl Into<String>, kind: FileKind) -> Self {
        let mut spec = Self::with_source(ExtractionSource::File, FieldSpec::new(name, FieldType::Any));
        spec.file = Some(kind);
        spec
    }

    /// Reads a lone body parameter under its own key.
    #[must_use]
    pub fn embed(mut self) -> Self {
        self.embed = true;
        self
    }

    /// Sets the documentation description of a file parameter.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field = self.field.description(description);
        self
    }

    /// Returns the request channel.
    #[must_use]
    pub fn source(&self) -> ExtractionSource {
        self.source
    }

    /// Returns the internal name handlers look the value up by.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// Returns the name the value is read under.
    #[must_use]
    pub fn external_name(&self) -> &str {
        &self.external
    }

    /// Returns the field declaration.
    #[must_use]
    pub fn field(&self) -> &FieldSpec {
        &self.field
    }

    /// Returns true if the parameter was marked embedded.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.embed
    }

    /// Returns how a file parameter is delivered.
    #[must_use]
    pub fn file_kind(&self) -> Option<FileKind> {
        self.file
    }

    /// Renders the OpenAPI parameter object for path, query, header and
    /// cookie parameters.
    #[must_use]
    pub fn describe_parameter(&self) -> Option<Value> {
        let location = self.source.openapi_location()?;
        let mut out = Map::new();
        out.insert("name".into(), json!(self.external));
        out.insert("in".into(), json!(location));
        out.insert(
            "required".into(),
            json!(self.source == ExtractionSource::Path || self.field.is_required()),
        );
        let mut schema = self.field.describe();
        if let Value::Object(map) = &mut schema {
            if let Some(description) = map.remove("description") {
                out.insert("description".into(), description);
            }
        }
        out.insert("schema".into(), schema);
        if !self.field.examples().is_empty() {
            out.insert(
                "examples".into(),
                emporium_core::schema::describe_examples(self.field.examples()),
            );
        }
        Some(Value::Object(out))
    }

    /// Renders the schema of this parameter as a body property.
    #[must_use]
    pub fn describe_property(&self) -> Value {
        match self.file {
            Some(FileKind::UploadList) => {
                json!({"type": "array", "items": {"type": "string", "format": "binary"}})
            }
            Some(_) => json!({"type": "string", "format": "binary"}),
            None => {
                let mut schema = self.field.describe();
                if let Value::Object(map) = &mut schema {
                    if !self.field.examples().is_empty() {
                        map.insert(
                            "examples".into(),
                            emporium_core::schema::describe_examples(self.field.examples()),
                        );
                    }
                }
                schema
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_name_conversion() {
        let p = ParamSpec::header(FieldSpec::new("user_agent", FieldType::String).optional());
        assert_eq!(p.external_name(), "user-agent");
        assert_eq!(p.name(), "user_agent");
    }

    #[test]
    fn test_header_alias_is_kept() {
        let p = ParamSpec::header(
            FieldSpec::new("token", FieldType::String)
                .alias("X-Token")
                .optional(),
        );
        assert_eq!(p.external_name(), "x-token");
    }

    #[test]
    fn test_query_alias() {
        let p = ParamSpec::query(FieldSpec::new("q", FieldType::String).alias("item-query").optional());
        assert_eq!(p.external_name(), "item-query");
        assert_eq!(p.name(), "q");
    }

    #[test]
    fn test_file_params() {
        let p = ParamSpec::uploads("files");
        assert_eq!(p.source(), ExtractionSource::File);
        assert_eq!(p.file_kind(), Some(FileKind::UploadList));
        assert_eq!(p.describe_property()["type"], "array");
        assert!(p.describe_parameter().is_none());
    }

    #[test]
    fn test_describe_path_parameter() {
        let p = ParamSpec::path(
            FieldSpec::new("item_id", FieldType::Integer)
                .gt(1.0)
                .le(125.0)
                .title("Id of the Item"),
        );
        let d = p.describe_parameter().unwrap();
        assert_eq!(d["in"], "path");
        assert_eq!(d["required"], true);
        assert_eq!(d["schema"]["exclusiveMinimum"], 1.0);
        assert_eq!(d["schema"]["title"], "Id of the Item");
    }

    #[test]
    fn test_describe_query_moves_description_up() {
        let p = ParamSpec::query(
            FieldSpec::new("q", FieldType::String)
                .optional()
                .description("Query string"),
        );
        let d = p.describe_parameter().unwrap();
        assert_eq!(d["required"], false);
        assert_eq!(d["description"], "Query string");
        assert!(d["schema"].get("description").is_none());
    }

    #[test]
    fn test_embed_flag() {
        let p = ParamSpec::body(FieldSpec::new("item", FieldType::Any)).embed();
        assert!(p.is_embedded());
    }
}
