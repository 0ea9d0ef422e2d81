use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use stafflink::auth::Authenticator;
use stafflink::config::{AuthConfig, IamConfig, UploadConfig};
use stafflink::integrations::smart::SmartBatchWriter;
use stafflink::integrations::storage::LocalStorage;
use stafflink::recruitment::{backoffice_router, public_router, MemoryStore, RecruitmentState};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    _workdir: tempfile::TempDir,
}

pub fn test_app() -> TestApp {
    let workdir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(LocalStorage::new(workdir.path().join("uploads")));
    let uploads = UploadConfig {
        max_size_bytes: 1024 * 1024,
        allowed_extensions: vec!["pdf".to_string(), "jpg".to_string(), "png".to_string()],
    };
    let writer = SmartBatchWriter::new(workdir.path().join("exports"));

    let iam = IamConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        app_id: "stafflink".to_string(),
        control_app_id: None,
        timeout_seconds: 1,
        service_token: None,
        service_user: None,
        service_password: None,
        recruiter_role_name: "recruiter".to_string(),
    };
    let auth = AuthConfig {
        cookie_name: "stafflink_access_token".to_string(),
        cookie_secure: false,
        cookie_path: "/".to_string(),
        allow_debug_headers: true,
    };
    let authenticator = Arc::new(Authenticator::new(&iam, &auth));

    let state = RecruitmentState::new(store.clone(), storage, uploads, writer, authenticator);
    let router = public_router(state.clone()).merge(backoffice_router(state));

    TestApp {
        router,
        store,
        _workdir: workdir,
    }
}

pub struct Caller {
    pub user_id: Uuid,
    pub name: &'static str,
    pub permissions: &'static str,
}

impl Caller {
    pub fn new(permissions: &'static str) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name: "Rosa Perez",
            permissions,
        }
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub fn authed(mut request: Request<Body>, caller: &Caller) -> Request<Body> {
    let headers = request.headers_mut();
    headers.insert(
        "x-stafflink-user-id",
        caller.user_id.to_string().parse().expect("header value"),
    );
    headers.insert(
        "x-stafflink-user-name",
        caller.name.parse().expect("header value"),
    );
    headers.insert(
        "x-stafflink-permissions",
        caller.permissions.parse().expect("header value"),
    );
    request
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}

pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    read_json(response).await
}

/// Multipart body for the public document upload endpoint.
pub fn multipart_upload(uri: &str, kind: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "stafflink-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Disposition: form-data; name=\"kind\"\r\n\r\n{kind}\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}
