use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use thiserror::Error;

use doctext_core::UploadPayload;

/// Form field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read form data: {0}")]
    Malformed(String),
    #[error("No file uploaded")]
    MissingFile,
    #[error("Uploaded file has no file name")]
    MissingFileName,
    /// The body outgrew the transport limit before it was fully read.
    #[error("request body exceeds the transport limit")]
    BodyTooLarge,
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::BodyTooLarge
        } else {
            UploadError::Malformed(e.body_text())
        }
    }
}

/// Read the `file` field of a multipart upload. The first `file` field wins;
/// every other field is drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadPayload, UploadError> {
    let mut payload: Option<UploadPayload> = None;

    while let Some(field) = multipart.next_field().await? {
        if payload.is_none() && field.name() == Some(FILE_FIELD) {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .ok_or(UploadError::MissingFileName)?;
            let data = field.bytes().await?;
            payload = Some(UploadPayload::new(file_name, data.to_vec()));
        } else {
            let _ = field.bytes().await?;
        }
    }

    payload.ok_or(UploadError::MissingFile)
}
