use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use doctext_core::ExtractError;

use crate::models::ErrorResponse;
use crate::state::AppState;
use crate::upload::{self, UploadError};

pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let payload = match upload::parse_multipart(multipart).await {
        Ok(p) => p,
        Err(UploadError::BodyTooLarge) => {
            // Only a lower bound on the size is known once the transport gives up.
            let err = ExtractError::PayloadTooLarge {
                size: state.body_limit(),
                limit: state.dispatcher.max_payload_bytes(),
            };
            tracing::info!(limit = state.dispatcher.max_payload_bytes(), "upload rejected by body limit");
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
        Err(e) => {
            tracing::info!(error = %e, "malformed upload");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let file_name = payload.file_name.clone();
    let size = payload.len();
    let dispatcher = state.dispatcher.clone();

    // Strategies block on file I/O, MuPDF and the OCR subprocess
    let outcome = tokio::task::spawn_blocking(move || dispatcher.extract(&payload)).await;

    match outcome {
        Ok(Ok(result)) => {
            tracing::info!(
                file_name = %result.file_name,
                file_type = %result.file_type,
                size,
                chars = result.extracted_text.len(),
                "text extracted"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Ok(Err(e)) if e.is_client_error() => {
            tracing::info!(file_name = %file_name, size, error = %e, "extraction rejected");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e)) => {
            tracing::error!(file_name = %file_name, size, error = %e, "extraction failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!(file_name = %file_name, size, error = %e, "extraction task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Extraction task failed: {}", e),
            )
        }
    }
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(detail))).into_response()
}
