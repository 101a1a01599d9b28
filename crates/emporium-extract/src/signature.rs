//! Endpoint signatures and argument binding.
//!
//! A [`Signature`] is the ordered list of [`ParamSpec`]s of one endpoint.
//! [`Signature::bind`] reads every declared input from its channel, runs it
//! through the validation engine, and either returns the coerced
//! [`Arguments`] or one [`ApiError`] carrying every failure found.
//!
//! # Example
//!
//! ```rust
//! use emporium_core::{FieldSpec, FieldType};
//! use emporium_extract::{ExtractionContext, ParamSpec, Signature, UploadLimits};
//! use http::Uri;
//!
//! # tokio_test::block_on(async {
//! let sig = Signature::new()
//!     .param(ParamSpec::query(FieldSpec::new("skip", FieldType::Integer).default(0.into())))
//!     .param(ParamSpec::query(FieldSpec::new("limit", FieldType::Integer).default(10.into())));
//!
//! let ctx = ExtractionContext::builder()
//!     .uri(Uri::from_static("/items?limit=2"))
//!     .build();
//! let args = sig.bind(&ctx, &UploadLimits::default()).await.unwrap();
//! assert_eq!(args.get::<i64>("skip").unwrap(), 0);
//! assert_eq!(args.get::<i64>("limit").unwrap(), 2);
//! # });
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use emporium_core::schema::{collect_models, describe_examples};
use emporium_core::validate::{validate_field, Mode};
use emporium_core::{ApiError, FieldError, FieldErrors, Schema};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::cookie::Cookies;
use crate::error::{ExtractionError, ExtractionSource};
use crate::form::FormData;
use crate::multipart::{Multipart, MultipartForm, UploadLimits};
use crate::param::{FileKind, ParamSpec};
use crate::upload::UploadFile;
use crate::ExtractionContext;

/// Coerced handler inputs, keyed by internal parameter name.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: HashMap<String, Value>,
    bytes: HashMap<String, Bytes>,
    files: HashMap<String, Vec<UploadFile>>,
}

impl Arguments {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a coerced value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns a coerced value. Absent optional parameters are `null`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserialises a coerced value into `T`.
    ///
    /// Use `Option<T>` for optional parameters. Asking for a name the
    /// signature never declared is a server fault.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ApiError::internal(format!("undeclared argument '{name}'")))?;
        serde_json::from_value(value.clone()).map_err(|e| {
            ApiError::internal_with_source(format!("argument '{name}' has an unexpected shape"), e)
        })
    }

    /// Returns a file parameter read into memory.
    pub fn bytes(&self, name: &str) -> Result<Bytes, ApiError> {
        self.bytes
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("undeclared file argument '{name}'")))
    }

    /// Returns a single uploaded file.
    pub fn upload(&self, name: &str) -> Result<UploadFile, ApiError> {
        self.files
            .get(name)
            .and_then(|files| files.first())
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("undeclared upload argument '{name}'")))
    }

    /// Returns every uploaded file sent under `name`, in upload order.
    #[must_use]
    pub fn uploads(&self, name: &str) -> Vec<UploadFile> {
        self.files.get(name).cloned().unwrap_or_default()
    }
}

/// Ordered binding descriptors of one endpoint.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<ParamSpec>,
}

impl Signature {
    /// Creates an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn body_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|p| p.source() == ExtractionSource::Body)
    }

    fn form_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|p| matches!(p.source(), ExtractionSource::Form | ExtractionSource::File))
    }

    /// True when a lone body parameter consumes the whole body.
    fn body_is_whole(&self) -> bool {
        let mut body = self.body_params();
        matches!((body.next(), body.next()), (Some(p), None) if !p.is_embedded())
    }

    /// Binds every parameter from `ctx`.
    ///
    /// Failures from path, query, header, cookie, form and file parameters
    /// make the result an [`ApiError::Binding`]; when only body fields fail
    /// it is an [`ApiError::Validation`]. Either way every failure is
    /// reported, in declaration order.
    pub async fn bind(
        &self,
        ctx: &ExtractionContext,
        limits: &UploadLimits,
    ) -> Result<Arguments, ApiError> {
        if ctx.body().len() > limits.max_body_size {
            return Err(ExtractionError::payload_too_large(limits.max_body_size, ctx.body().len()).into());
        }

        let form = if self.form_params().next().is_some() {
            read_form(ctx, limits).await?
        } else {
            MultipartForm::default()
        };
        let cookies = Cookies::from_headers(ctx.headers());
        let body = self.parse_body(ctx);
        let whole = self.body_is_whole();

        let mut args = Arguments::new();
        let mut errors = FieldErrors::new();
        let mut source_failed = false;
        let mut body_reported = false;

        for p in &self.params {
            let source = p.source();
            let ext = p.external_name();

            let result = match source {
                ExtractionSource::Body => match &body {
                    Err(e) => {
                        if !body_reported {
                            errors.push(e.clone());
                            body_reported = true;
                        }
                        continue;
                    }
                    Ok(doc) => {
                        let raw = if whole {
                            doc.clone()
                        } else {
                            doc.as_ref().and_then(|d| d.get(ext)).cloned()
                        };
                        validate_field(p.field(), raw.as_ref(), Mode::Json)
                            .map_err(|e| if whole { e } else { e.at(ext) })
                    }
                },
                ExtractionSource::File => {
                    match bind_file(p, &form, &mut args).await {
                        Ok(()) => continue,
                        Err(BindFileError::Missing) => {
                            Err(FieldErrors::single(FieldError::missing().at(ext)))
                        }
                        Err(BindFileError::Read(e)) => return Err(e.into()),
                    }
                }
                _ => {
                    let values: Vec<&str> = match source {
                        ExtractionSource::Path => ctx.path_params().get(ext).into_iter().collect(),
                        ExtractionSource::Query => ctx.query_values(ext),
                        ExtractionSource::Header => ctx.header_values(ext),
                        ExtractionSource::Cookie => cookies.get(ext).into_iter().collect(),
                        _ => form.fields.get_all(ext),
                    };
                    let raw = text_value(p, &values);
                    validate_field(p.field(), raw.as_ref(), Mode::Text).map_err(|e| e.at(ext))
                }
            };

            match result {
                Ok(value) => args.insert(p.name(), value),
                Err(e) => {
                    source_failed |= source.is_textual();
                    errors.extend(e.from_source(source.as_str()));
                }
            }
        }

        if errors.is_empty() {
            Ok(args)
        } else if source_failed {
            Err(ApiError::binding(errors))
        } else {
            Err(ApiError::validation(errors))
        }
    }

    /// Parses the JSON body once. An empty body is absent, not an error.
    fn parse_body(&self, ctx: &ExtractionContext) -> Result<Option<Value>, FieldError> {
        if self.body_params().next().is_none() || ctx.is_body_empty() {
            return Ok(None);
        }
        // A body declared as some other media type is not read as JSON.
        if let Some(m) = ctx.mime() {
            let is_json = m.essence_str() == "application/json" || m.suffix() == Some(mime::JSON);
            if !is_json {
                return Err(FieldError::new(
                    "model_attributes_type",
                    "Input should be a valid dictionary or object to extract fields from",
                )
                .with_input(Value::String(m.essence_str().to_string()))
                .from_source(ExtractionSource::Body.as_str()));
            }
        }
        serde_json::from_slice(ctx.body()).map(Some).map_err(|e| {
            FieldError::new("json_invalid", format!("JSON decode error: {e}"))
                .from_source(ExtractionSource::Body.as_str())
        })
    }

    /// Returns every schema referenced by a parameter.
    #[must_use]
    pub fn schemas(&self) -> Vec<&'static Schema> {
        let mut found = Vec::new();
        for p in &self.params {
            collect_models(p.field().ty(), &mut found);
        }
        found
    }

    /// Renders the OpenAPI `parameters` array.
    #[must_use]
    pub fn describe_parameters(&self) -> Vec<Value> {
        self.params
            .iter()
            .filter_map(ParamSpec::describe_parameter)
            .collect()
    }

    /// Renders the OpenAPI `requestBody` object, if the endpoint has one.
    #[must_use]
    pub fn describe_request_body(&self) -> Option<Value> {
        if self.body_params().next().is_some() {
            let (schema, examples, required) = if self.body_is_whole() {
                let p = self.body_params().next()?;
                (
                    p.field().describe(),
                    p.field().examples(),
                    p.field().is_required(),
                )
            } else {
                let params: Vec<&ParamSpec> = self.body_params().collect();
                (object_schema(&params), &[][..], params.iter().any(|p| p.field().is_required()))
            };
            let mut media = Map::new();
            media.insert("schema".into(), schema);
            if !examples.is_empty() {
                media.insert("examples".into(), describe_examples(examples));
            }
            return Some(json!({
                "required": required,
                "content": {"application/json": Value::Object(media)}
            }));
        }

        let params: Vec<&ParamSpec> = self.form_params().collect();
        if params.is_empty() {
            return None;
        }
        let media_type = if params.iter().any(|p| p.file_kind().is_some()) {
            "multipart/form-data"
        } else {
            "application/x-www-form-urlencoded"
        };
        Some(json!({
            "required": true,
            "content": {media_type: {"schema": object_schema(&params)}}
        }))
    }
}

fn object_schema(params: &[&ParamSpec]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.external_name().to_string(), p.describe_property()))
        .collect();
    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.field().is_required())
        .map(|p| p.external_name())
        .collect();
    json!({"type": "object", "properties": properties, "required": required})
}

/// Turns the raw strings of a textual channel into the value handed to the
/// validation engine. Sequences keep every occurrence; scalars take the
/// last.
fn text_value(p: &ParamSpec, values: &[&str]) -> Option<Value> {
    if values.is_empty() {
        return None;
    }
    if p.field().ty().is_sequence() {
        Some(Value::Array(
            values.iter().map(|v| Value::String((*v).to_string())).collect(),
        ))
    } else {
        values.last().map(|v| Value::String((*v).to_string()))
    }
}

enum BindFileError {
    Missing,
    Read(ExtractionError),
}

async fn bind_file(
    p: &ParamSpec,
    form: &MultipartForm,
    args: &mut Arguments,
) -> Result<(), BindFileError> {
    let files = form.files_named(p.external_name());
    let Some(first) = files.first() else {
        return Err(BindFileError::Missing);
    };
    match p.file_kind() {
        Some(FileKind::Bytes) => {
            let data = first.read().await.map_err(BindFileError::Read)?;
            args.bytes.insert(p.name().to_string(), data);
        }
        Some(FileKind::Upload) => {
            args.files.insert(p.name().to_string(), vec![first.clone()]);
        }
        Some(FileKind::UploadList) | None => {
            args.files.insert(p.name().to_string(), files);
        }
    }
    Ok(())
}

async fn read_form(
    ctx: &ExtractionContext,
    limits: &UploadLimits,
) -> Result<MultipartForm, ExtractionError> {
    match ctx.mime() {
        Some(m) if m.type_() == mime::MULTIPART && m.subtype() == mime::FORM_DATA => {
            Multipart::from_request(ctx.headers(), ctx.body().clone(), limits.clone())?
                .collect()
                .await
        }
        Some(m) if m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
            Ok(MultipartForm {
                fields: FormData::from_urlencoded(ctx.body())?,
                files: Vec::new(),
            })
        }
        _ => Ok(MultipartForm::default()),
    }
}
