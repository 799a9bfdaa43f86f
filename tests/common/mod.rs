#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use blog_backend::{
    AppState,
    cache::Cache,
    config::Config,
    database::Repositories,
    infrastructure::LocalFileStorage,
    router::create_router,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::local("integration-secret");
        config.bcrypt_cost = 4;
        config.upload_dir = upload_dir.path().to_string_lossy().into_owned();

        let repos = Repositories::in_memory();
        let cache = Cache::in_memory(config.cache_ttl());
        let uploads = Arc::new(LocalFileStorage::new(upload_dir.path()));
        let state = AppState::new(config, repos.clone(), cache, uploads);

        Self {
            router: create_router(state),
            repos,
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// 注册并登录，返回 `token=...` 形式的 cookie
    pub async fn register_and_login(&self, username: &str) -> String {
        let email = format!("{}@example.com", username);
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/signup",
                None,
                json!({ "username": username, "email": email, "password": "secret" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "secret" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login sets session cookie")
    }

    pub async fn create_post(&self, cookie: &str, title: &str, content: &str) -> Value {
        let response = self
            .send(multipart_request(
                "POST",
                "/api/posts/create",
                cookie,
                &[("title", title), ("content", content)],
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["resp_data"].clone()
    }
}

/// 从 Set-Cookie 中取出 `token=...` 部分
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with("token="))
        .and_then(|value| value.split(';').next().map(str::to_string))
}

pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

/// 构造 multipart/form-data 请求，`image` 为 (文件名, 内容)
pub fn multipart_request(
    method: &str,
    uri: &str,
    cookie: &str,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .expect("request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
