//! Router tests through `tower::ServiceExt::oneshot` with stub backends.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use doctext_core::{BackendError, Dispatcher, ExtractionBackend, MAX_PAYLOAD_BYTES, TempFileStager};
use doctext_web::{AppState, router};

const BOUNDARY: &str = "doctext-test-boundary";

enum Stub {
    Text(&'static str),
    Fail(&'static str),
    Panic,
}

impl ExtractionBackend for Stub {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        assert!(path.exists(), "staged file missing during extraction");
        match self {
            Stub::Text(text) => Ok(text.to_string()),
            Stub::Fail(message) => Err(BackendError::OpenError(message.to_string())),
            Stub::Panic => panic!("backend blew up"),
        }
    }
}

struct TestApp {
    app: axum::Router,
    staging: tempfile::TempDir,
}

fn app_with(pdf: Stub, document: Stub, image: Stub) -> TestApp {
    let staging = tempfile::tempdir().unwrap();
    let dispatcher = Dispatcher::builder()
        .pdf(Arc::new(pdf))
        .document(Arc::new(document))
        .image(Arc::new(image))
        .stager(Arc::new(TempFileStager::in_dir(staging.path())))
        .build()
        .unwrap();
    TestApp {
        app: router(Arc::new(AppState::new(dispatcher))),
        staging,
    }
}

fn default_app() -> TestApp {
    app_with(
        Stub::Text("pdf text"),
        Stub::Text("Hello\nWorld\n"),
        Stub::Text("ocr text"),
    )
}

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    data: &'a [u8],
}

fn file_part<'a>(file_name: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name: "file",
        file_name: Some(file_name),
        data,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract-text")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn health_reports_ok() {
    let t = default_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn pdf_upload_returns_extracted_text() {
    let t = default_app();
    let (status, json) = send(t.app, upload_request(&[file_part("report.pdf", b"%PDF-1.4")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "file_name": "report.pdf",
            "file_type": "pdf",
            "extracted_text": "pdf text",
        })
    );
    assert_eq!(staged_files(t.staging.path()), 0);
}

#[tokio::test]
async fn docx_upload_keeps_paragraph_newlines() {
    let t = default_app();
    let (status, json) = send(t.app, upload_request(&[file_part("notes.docx", b"PK")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["file_type"], "docx");
    assert_eq!(json["extracted_text"], "Hello\nWorld\n");
}

#[tokio::test]
async fn uppercase_extension_reports_lowercase_type() {
    let t = default_app();
    let (status, json) = send(t.app, upload_request(&[file_part("SCAN.JPG", b"\xff\xd8")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["file_name"], "SCAN.JPG");
    assert_eq!(json["file_type"], "jpg");
    assert_eq!(json["extracted_text"], "ocr text");
}

#[tokio::test]
async fn unsupported_extension_is_bad_request() {
    let t = default_app();
    let (status, json) = send(t.app, upload_request(&[file_part("notes.txt", b"hello")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Unsupported file type: txt");
    assert_eq!(staged_files(t.staging.path()), 0);
}

#[tokio::test]
async fn payload_over_ceiling_is_bad_request() {
    let t = default_app();
    let data = vec![0u8; MAX_PAYLOAD_BYTES + 1];
    let (status, json) = send(t.app, upload_request(&[file_part("big.png", &data)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "File too large. Max size is 10 MB.");
    assert_eq!(staged_files(t.staging.path()), 0);
}

#[tokio::test]
async fn payload_at_ceiling_is_accepted() {
    let t = default_app();
    let data = vec![b'a'; MAX_PAYLOAD_BYTES];
    let (status, json) = send(t.app, upload_request(&[file_part("big.pdf", &data)])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["extracted_text"], "pdf text");
}

#[tokio::test]
async fn body_over_transport_limit_gets_same_message() {
    let t = default_app();
    let data = vec![0u8; MAX_PAYLOAD_BYTES + 2 * 1024 * 1024];
    let (status, json) = send(t.app, upload_request(&[file_part("huge.pdf", &data)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "File too large. Max size is 10 MB.");
}

#[tokio::test]
async fn strategy_failure_is_tagged_bad_request() {
    let t = app_with(
        Stub::Text("unused"),
        Stub::Fail("boom"),
        Stub::Text("unused"),
    );
    let (status, json) = send(t.app, upload_request(&[file_part("broken.docx", b"x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "DOCX extraction failed: failed to open input: boom");
    assert_eq!(staged_files(t.staging.path()), 0);
}

#[tokio::test]
async fn blank_text_becomes_sentinel() {
    let t = app_with(
        Stub::Text(" \n\t "),
        Stub::Text("unused"),
        Stub::Text("unused"),
    );
    let (status, json) = send(t.app, upload_request(&[file_part("empty.pdf", b"%PDF")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["extracted_text"], "No readable text found.");
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let t = default_app();
    let parts = [Part {
        name: "comment",
        file_name: None,
        data: b"no file here",
    }];
    let (status, json) = send(t.app, upload_request(&parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "No file uploaded");
}

#[tokio::test]
async fn extra_fields_are_ignored() {
    let t = default_app();
    let parts = [
        Part {
            name: "comment",
            file_name: None,
            data: b"before",
        },
        file_part("scan.png", b"\x89PNG"),
        Part {
            name: "other",
            file_name: Some("ignored.txt"),
            data: b"after",
        },
    ];
    let (status, json) = send(t.app, upload_request(&parts)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["file_name"], "scan.png");
    assert_eq!(json["file_type"], "png");
}

#[tokio::test]
async fn non_multipart_request_is_bad_request() {
    let t = default_app();
    let request = Request::builder()
        .method("POST")
        .uri("/extract-text")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"file": "report.pdf"}"#))
        .unwrap();
    let (status, json) = send(t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn staging_fault_is_server_error() {
    let missing = tempfile::tempdir().unwrap().path().join("gone");
    let dispatcher = Dispatcher::builder()
        .pdf(Arc::new(Stub::Text("unused")))
        .document(Arc::new(Stub::Text("unused")))
        .image(Arc::new(Stub::Text("unused")))
        .stager(Arc::new(TempFileStager::in_dir(missing)))
        .build()
        .unwrap();
    let app = router(Arc::new(AppState::new(dispatcher)));
    let (status, json) = send(app, upload_request(&[file_part("report.pdf", b"%PDF")])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["detail"].as_str().unwrap().starts_with("staging failed"));
}

#[tokio::test]
async fn backend_panic_is_server_error_and_cleans_up() {
    let t = app_with(Stub::Text("unused"), Stub::Text("unused"), Stub::Panic);
    let (status, json) = send(t.app, upload_request(&[file_part("scan.jpeg", b"\xff\xd8")])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["detail"].as_str().unwrap().starts_with("Extraction task failed"));
    assert_eq!(staged_files(t.staging.path()), 0);
}
