mod common;

use std::fs;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{fixture_dir, fixture_manager, snapshot};
use http_body_util::BodyExt;
use nanomanager::server::{AppState, UploadLimits, build_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "nanomanager-test-boundary";
const MAX_UPLOAD_SIZE: u64 = 1024;
const MAX_FILES: u64 = 4;

fn limits() -> UploadLimits {
    UploadLimits {
        max_file_size: MAX_UPLOAD_SIZE,
        max_files: MAX_FILES,
    }
}

fn router(dir: &TempDir) -> Router {
    build_router("/api", "/files", AppState::new(fixture_manager(dir), limits()))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, content_type, body)
}

fn json_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_body(operation_type: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"operationType\"\r\n\r\n{operation_type}\r\n"
        )
        .as_bytes(),
    );
    for (name, contents) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files[]\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(operation_type: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(operation_type, files)))
        .unwrap()
}

fn no_temp_files_left(dir: &TempDir) -> bool {
    !snapshot(dir.path()).iter().any(|name| name.starts_with(".upload-"))
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn get_serves_frontend_with_api_url() {
    let dir = fixture_dir();
    let request = Request::builder().uri("/api").body(Body::empty()).unwrap();

    let (status, content_type, body) = send(router(&dir), request).await;
    let page = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert!(page.contains(r#"<nano-manager api-url="/api">"#));
    assert!(page.contains("customElements.define"));
    assert!(!page.contains("%NANOMANAGER_"));
}

#[tokio::test]
async fn json_list_files() {
    let dir = fixture_dir();

    let (status, content_type, body) = send(
        router(&dir),
        json_request(json!({ "operationType": "listFiles", "parameters": {} })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(
        parse(&body),
        json!({
            "data": {
                "files": ["1a.txt", "2b.txt", "11c.txt", "hello.txt", "Second-file.txt"],
                "baseUrl": "/files",
            }
        })
    );
}

#[tokio::test]
async fn json_rename_and_delete() {
    let dir = fixture_dir();

    let (_, _, body) = send(
        router(&dir),
        json_request(json!({
            "operationType": "renameFile",
            "parameters": { "oldName": "hello.txt", "newName": "renamed.txt" },
        })),
    )
    .await;
    assert_eq!(parse(&body), json!({ "data": { "newName": "renamed.txt" } }));

    let (_, _, body) = send(
        router(&dir),
        json_request(json!({
            "operationType": "deleteFile",
            "parameters": { "filename": "renamed.txt" },
        })),
    )
    .await;
    assert_eq!(parse(&body), json!({ "data": { "success": true } }));
    assert!(!dir.path().join("renamed.txt").exists());
}

#[tokio::test]
async fn unsupported_operation_is_bad_request() {
    let dir = fixture_dir();
    let before = snapshot(dir.path());

    let (status, content_type, body) = send(
        router(&dir),
        json_request(json!({ "operationType": "frobnicate", "parameters": {} })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(parse(&body), json!({ "error": "Unsupported operation 'frobnicate'" }));
    assert_eq!(snapshot(dir.path()), before);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let dir = fixture_dir();
    let request = Request::builder()
        .method("POST")
        .uri("/api")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, body) = send(router(&dir), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body), json!({ "error": "Unsupported operation ''" }));
}

#[tokio::test]
async fn multipart_upload_stores_valid_files() {
    let dir = fixture_dir();

    let (status, _, body) = send(
        router(&dir),
        multipart_request(
            "uploadFile",
            &[
                ("new.txt", b"fresh contents".as_slice()),
                (".htaccess", b"deny from all".as_slice()),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({ "data": { "uploadedFiles": ["new.txt"], "filesWithErrors": [".htaccess"] } })
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("new.txt")).unwrap(),
        "fresh contents"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(".htaccess")).unwrap(),
        "contents of .htaccess"
    );
    assert!(no_temp_files_left(&dir), "temporary upload files left behind");
}

#[tokio::test]
async fn multipart_upload_rejects_oversized_files() {
    let dir = fixture_dir();
    let before = snapshot(dir.path());
    let oversized = vec![b'x'; MAX_UPLOAD_SIZE as usize + 1];

    let (_, _, body) = send(
        router(&dir),
        multipart_request("uploadFile", &[("big.bin", oversized.as_slice())]),
    )
    .await;

    assert_eq!(
        parse(&body),
        json!({ "data": { "uploadedFiles": [], "filesWithErrors": ["big.bin"] } })
    );
    assert_eq!(snapshot(dir.path()), before);
}

#[tokio::test]
async fn multipart_without_files_reports_empty_lists() {
    let dir = fixture_dir();

    let (status, _, body) = send(router(&dir), multipart_request("uploadFile", &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({ "data": { "uploadedFiles": [], "filesWithErrors": [] } })
    );
}

#[tokio::test]
async fn serves_managed_files_only() {
    let dir = fixture_dir();

    let request = Request::builder().uri("/files/hello.txt").body(Body::empty()).unwrap();
    let response = router(&dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        "contents of hello.txt".len().to_string().as_str()
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), b"contents of hello.txt");

    for uri in ["/files/.htaccess", "/files/subdir", "/files/missing.txt", "/files/..%2Fsecret"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, _) = send(router(&dir), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri} was served");
    }
}

fn over_budget_upload() -> Vec<u8> {
    let contents = vec![b'x'; 1000];
    let names: Vec<String> = (0..50).map(|i| format!("part-{i}.bin")).collect();
    let files: Vec<(&str, &[u8])> = names
        .iter()
        .map(|name| (name.as_str(), contents.as_slice()))
        .collect();
    multipart_body("uploadFile", &files)
}

#[tokio::test]
async fn declared_body_over_budget_is_refused() {
    let dir = fixture_dir();
    let before = snapshot(dir.path());
    let body = over_budget_upload();
    let request = Request::builder()
        .method("POST")
        .uri("/api")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, content_type, body) = send(router(&dir), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(
        parse(&body),
        json!({ "error": format!("Request body exceeds {} bytes", limits().max_body_size()) })
    );
    assert_eq!(snapshot(dir.path()), before);
}

#[tokio::test]
async fn streamed_body_over_budget_is_refused() {
    let dir = fixture_dir();
    let before = snapshot(dir.path());

    // No content-length: the limit trips while the parts are being read.
    let request = Request::builder()
        .method("POST")
        .uri("/api")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(over_budget_upload()))
        .unwrap();

    let (status, _, _) = send(router(&dir), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(snapshot(dir.path()), before);
    assert!(no_temp_files_left(&dir), "temporary upload files left behind");
}

#[tokio::test]
async fn multipart_content_type_is_case_insensitive() {
    let dir = fixture_dir();
    let request = Request::builder()
        .method("POST")
        .uri("/api")
        .header(
            header::CONTENT_TYPE,
            format!("Multipart/Form-Data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(
            "uploadFile",
            &[("mixed.txt", b"mixed case".as_slice())],
        )))
        .unwrap();

    let (status, _, body) = send(router(&dir), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({ "data": { "uploadedFiles": ["mixed.txt"], "filesWithErrors": [] } })
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("mixed.txt")).unwrap(),
        "mixed case"
    );
}
