use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Response},
    middleware::Next,
    response::IntoResponse,
};

/// Middlware to trace headers.
///
/// The `Authorization` header is masked.
pub async fn trace_headers(req: Request, next: Next) -> impl IntoResponse {
    let incoming_headers = masked(req.headers());
    tracing::trace!(?incoming_headers, "Headers");

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    let outgoing_headers = &parts.headers;
    tracing::trace!(?outgoing_headers, "Headers");

    Response::from_parts(parts, body)
}

fn masked(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static("..."));
    }

    headers
}
