use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};

/// 日志中最多保留的响应体字节数
const LOGGED_BODY_LIMIT: usize = 1024;

/// 5xx 响应体只是错误信封，读入内存后原样放回
async fn buffer_error_body(body: Body) -> Option<Bytes> {
    match to_bytes(body, LOGGED_BODY_LIMIT).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("Error response body not buffered: {}", e);
            None
        }
    }
}

/// 记录服务端错误及触发它的请求
pub async fn log_errors(req: Request, next: Next) -> Response {
    let route = format!("{} {}", req.method(), req.uri().path());
    let response = next.run(req).await;
    let status = response.status();
    if !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let Some(bytes) = buffer_error_body(body).await else {
        tracing::error!(%status, "{} failed", route);
        return Response::from_parts(parts, Body::empty());
    };

    tracing::error!(%status, body = %String::from_utf8_lossy(&bytes), "{} failed", route);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
