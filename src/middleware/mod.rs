use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TraceId(pub String);

pub async fn assign_trace_id(mut req: Request<Body>, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(TraceId(trace_id.clone()));
    let mut res = next.run(req).await;
    res.headers_mut().insert(
        "X-Trace-Id",
        HeaderValue::from_str(&trace_id).unwrap_or(HeaderValue::from_static("invalid")),
    );
    res
}

pub async fn log_server_errors(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let res = next.run(req).await;
    if res.status().is_server_error() {
        tracing::warn!(
            %method,
            %path,
            %trace_id,
            status = res.status().as_u16(),
            "request failed"
        );
    }
    res
}
