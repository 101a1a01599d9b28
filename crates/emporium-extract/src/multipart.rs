//! Multipart form data parsing for file uploads.
//!
//! [`Multipart`] walks a `multipart/form-data` body part by part. Text parts
//! become form fields; parts carrying a file name are streamed to a spool and
//! become [`UploadFile`]s, in the order they were sent.

use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use http::{header, HeaderMap};

use crate::form::FormData;
use crate::upload::{Spooler, UploadFile};
use crate::ExtractionError;

/// Default maximum total body size (50 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum size per uploaded file (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of file parts.
pub const DEFAULT_MAX_FILES: usize = 20;

/// Size limits applied while binding a request.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum size per uploaded file in bytes.
    pub max_file_size: usize,
    /// Maximum number of file parts.
    pub max_files: usize,
    /// Directory for spooled uploads; the system temp dir when unset.
    pub spool_dir: Option<PathBuf>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            spool_dir: None,
        }
    }
}

impl UploadLimits {
    /// Create limits with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum file size.
    #[must_use]
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set the maximum number of files.
    #[must_use]
    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    /// Set the spool directory.
    #[must_use]
    pub fn spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = Some(dir.into());
        self
    }
}

/// Fully parsed multipart body.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    /// Text parts.
    pub fields: FormData,
    /// File parts in upload order.
    pub files: Vec<UploadFile>,
}

impl MultipartForm {
    /// Returns the files sent under `name`, in upload order.
    #[must_use]
    pub fn files_named(&self, name: &str) -> Vec<UploadFile> {
        self.files
            .iter()
            .filter(|f| f.field_name() == name)
            .cloned()
            .collect()
    }
}

/// Streaming reader over a `multipart/form-data` body.
pub struct Multipart {
    inner: multer::Multipart<'static>,
    limits: UploadLimits,
}

impl Multipart {
    /// Create a reader from request components.
    ///
    /// # Errors
    ///
    /// Returns an error if the Content-Type header has no usable boundary or
    /// the body exceeds the size limit.
    pub fn from_request(
        headers: &HeaderMap,
        body: Bytes,
        limits: UploadLimits,
    ) -> Result<Self, ExtractionError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ExtractionError::malformed("missing Content-Type header"))?;

        let boundary = multer::parse_boundary(content_type)
            .map_err(|_| ExtractionError::malformed("missing or invalid multipart boundary"))?;

        if body.len() > limits.max_body_size {
            return Err(ExtractionError::payload_too_large(
                limits.max_body_size,
                body.len(),
            ));
        }

        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        Ok(Self {
            inner: multer::Multipart::new(stream, boundary),
            limits,
        })
    }

    /// Reads every part.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is malformed, a file exceeds its limit,
    /// there are too many files, or spooling fails.
    pub async fn collect(mut self) -> Result<MultipartForm, ExtractionError> {
        let mut form = MultipartForm::default();

        while let Some(mut field) = self
            .inner
            .next_field()
            .await
            .map_err(ExtractionError::malformed)?
        {
            let name = field.name().unwrap_or_default().to_string();

            if field.file_name().is_none() {
                let text = field.text().await.map_err(ExtractionError::malformed)?;
                form.fields.push(name, text);
                continue;
            }

            if form.files.len() >= self.limits.max_files {
                return Err(ExtractionError::TooManyFiles {
                    max: self.limits.max_files,
                });
            }

            let filename = field.file_name().map(String::from);
            let content_type = field.content_type().map(ToString::to_string);
            let mut spooler =
                Spooler::create(self.limits.spool_dir.as_deref(), self.limits.max_file_size)?;
            while let Some(chunk) = field.chunk().await.map_err(ExtractionError::malformed)? {
                spooler.write(&chunk).await?;
            }
            let file = spooler.finish(name, filename, content_type).await?;
            tracing::debug!(
                field = file.field_name(),
                filename = file.filename(),
                size = file.size(),
                "spooled upload"
            );
            form.files.push(file);
        }

        Ok(form)
    }
}

impl std::fmt::Debug for Multipart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multipart")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
