//! File upload routes.
//!
//! Multi-file uploads are read concurrently; the response lists files in
//! the order they were sent.

use emporium_core::{ApiError, FieldSpec, FieldType};
use emporium_extract::{map_concurrent, Arguments, ExtractionError, ParamSpec, UploadFile};
use emporium_server::{Endpoint, Reply};
use serde::Serialize;
use serde_json::json;

/// What the upload endpoints report for one file.
#[derive(Debug, Serialize)]
struct FileSummary {
    filename: Option<String>,
    #[serde(rename = "contentType")]
    content_type: Option<String>,
    contents: String,
}

async fn summarize(file: UploadFile) -> Result<FileSummary, ExtractionError> {
    let data = file.read().await?;
    Ok(FileSummary {
        filename: file.filename().map(String::from),
        content_type: file.content_type().map(String::from),
        contents: String::from_utf8_lossy(&data).into_owned(),
    })
}

async fn create_file(args: Arguments) -> Result<Reply, ApiError> {
    let file = args.bytes("file")?;
    Ok(Reply::new(json!({ "file_size": file.len() })))
}

async fn create_upload_file(args: Arguments) -> Result<Reply, ApiError> {
    let summary = summarize(args.upload("file")?).await?;
    Reply::json(&summary)
}

async fn create_upload_files(args: Arguments) -> Result<Reply, ApiError> {
    let files = args.uploads("files");
    tracing::debug!(count = files.len(), "reading uploads");
    let summaries = map_concurrent(files, summarize).await?;
    Reply::json(&json!({ "files": summaries }))
}

async fn create_files_with_form(args: Arguments) -> Result<Reply, ApiError> {
    let file = args.bytes("file")?;
    let token: String = args.get("token")?;
    Ok(Reply::new(json!({ "file_size": file.len(), "token": token })))
}

pub(crate) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::post("/files/", "create_file", create_file)
            .param(ParamSpec::file_bytes("file").description("A file read as bytes")),
        Endpoint::post("/uploadfile/", "create_upload_file", create_upload_file)
            .param(ParamSpec::upload("file").description("A file read as UploadFile")),
        Endpoint::post("/uploadfiles/", "create_upload_files", create_upload_files)
            .param(ParamSpec::uploads("files")),
        Endpoint::post("/file_with_form", "create_files_with_form", create_files_with_form)
            .param(ParamSpec::file_bytes("file"))
            .param(ParamSpec::form(FieldSpec::new("token", FieldType::String))),
    ]
    .into_iter()
    .map(|e| e.tag("files"))
    .collect()
}
