//! Uploaded file handles.
//!
//! File parts are streamed to a temporary file while the multipart body is
//! parsed; an [`UploadFile`] keeps that spool alive and reads it back on
//! demand. The spool is removed when the last clone of the handle drops.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::try_join_all;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::ExtractionError;

/// Writes an incoming file part to disk, enforcing a size limit.
pub(crate) struct Spooler {
    spool: NamedTempFile,
    writer: tokio::fs::File,
    size: usize,
    limit: usize,
}

impl Spooler {
    /// Creates a spool in `dir`, or the system temp directory.
    pub(crate) fn create(dir: Option<&Path>, limit: usize) -> Result<Self, ExtractionError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("emporium-upload-");
        let spool = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let writer = tokio::fs::File::from_std(spool.reopen()?);
        Ok(Self {
            spool,
            writer,
            size: 0,
            limit,
        })
    }

    /// Appends a chunk.
    pub(crate) async fn write(&mut self, chunk: &[u8]) -> Result<(), ExtractionError> {
        self.size += chunk.len();
        if self.size > self.limit {
            return Err(ExtractionError::payload_too_large(self.limit, self.size));
        }
        self.writer.write_all(chunk).await?;
        Ok(())
    }

    /// Flushes the spool and wraps it in a handle.
    pub(crate) async fn finish(
        mut self,
        field_name: String,
        filename: Option<String>,
        content_type: Option<String>,
    ) -> Result<UploadFile, ExtractionError> {
        self.writer.flush().await?;
        Ok(UploadFile {
            field_name,
            filename,
            content_type,
            size: self.size,
            spool: Arc::new(self.spool),
        })
    }
}

/// A file received in a multipart request.
///
/// Cloning is cheap; clones share the same spooled payload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    field_name: String,
    filename: Option<String>,
    content_type: Option<String>,
    size: usize,
    spool: Arc<NamedTempFile>,
}

impl UploadFile {
    /// Spools an in-memory payload, for callers that already hold the bytes.
    pub async fn from_bytes(
        field_name: impl Into<String>,
        filename: Option<String>,
        content_type: Option<String>,
        data: &[u8],
        spool_dir: Option<&Path>,
    ) -> Result<Self, ExtractionError> {
        let mut spooler = Spooler::create(spool_dir, usize::MAX)?;
        spooler.write(data).await?;
        spooler
            .finish(field_name.into(), filename, content_type)
            .await
    }

    /// Returns the multipart field the file was sent under.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the client-supplied file name.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the declared content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the spool location.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.spool.path()
    }

    /// Reads the whole payload.
    pub async fn read(&self) -> Result<Bytes, ExtractionError> {
        let data = tokio::fs::read(self.spool.path()).await?;
        Ok(Bytes::from(data))
    }
}

/// Reads every file concurrently. Results follow the order of `files`.
pub async fn read_all(files: &[UploadFile]) -> Result<Vec<Bytes>, ExtractionError> {
    try_join_all(files.iter().map(UploadFile::read)).await
}

/// Runs `f` over every file concurrently and collects the results in upload
/// order, whatever order the futures complete in. The first error aborts the
/// batch.
pub async fn map_concurrent<T, E, F, Fut>(files: Vec<UploadFile>, f: F) -> Result<Vec<T>, E>
where
    F: FnMut(UploadFile) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    try_join_all(files.into_iter().map(f)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn upload(name: &str, data: &[u8]) -> UploadFile {
        UploadFile::from_bytes(
            "files",
            Some(name.to_string()),
            Some("text/plain".to_string()),
            data,
            None,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_roundtrip() {
        let file = upload("a.txt", b"hello").await;
        assert_eq!(file.filename(), Some("a.txt"));
        assert_eq!(file.content_type(), Some("text/plain"));
        assert_eq!(file.size(), 5);
        assert_eq!(file.read().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_spool_in_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadFile::from_bytes("file", None, None, b"x", Some(dir.path()))
            .await
            .unwrap();
        assert!(file.path().starts_with(dir.path()));
    }

    #[tokio::test]
    async fn test_spool_removed_on_drop() {
        let file = upload("gone.txt", b"bye").await;
        let path = file.path().to_path_buf();
        let clone = file.clone();
        drop(file);
        assert!(path.exists());
        drop(clone);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_spooler_enforces_limit() {
        let mut spooler = Spooler::create(None, 4).unwrap();
        spooler.write(b"abc").await.unwrap();
        let err = spooler.write(b"de").await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::PayloadTooLarge { max: 4, actual: 5 }
        ));
    }

    #[tokio::test]
    async fn test_read_all_preserves_order() {
        let files = vec![upload("a", b"A").await, upload("b", b"BB").await];
        let contents = read_all(&files).await.unwrap();
        assert_eq!(contents, vec![Bytes::from_static(b"A"), Bytes::from_static(b"BB")]);
    }

    #[tokio::test]
    async fn test_map_concurrent_order_independent_of_completion() {
        let files = vec![
            upload("A", b"1").await,
            upload("B", b"2").await,
            upload("C", b"3").await,
        ];

        // The first file finishes last.
        let names = map_concurrent(files, |file| async move {
            let delay = match file.filename() {
                Some("A") => 30,
                Some("B") => 10,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, ExtractionError>(file.filename().unwrap_or_default().to_string())
        })
        .await
        .unwrap();

        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_map_concurrent_propagates_error() {
        let files = vec![upload("A", b"1").await];
        let result: Result<Vec<()>, &str> = map_concurrent(files, |_| async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
    }
}
