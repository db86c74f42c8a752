use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};

use crate::error::{ApiError, ErrorVerbosityProvider, MethodNotAllowedError};

/// Middleware to map axum's `MethodNotAllowed` response to our [`ApiError`].
pub async fn method_not_allowed<S: ErrorVerbosityProvider>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = next.run(req).await;

    if resp.status() == StatusCode::METHOD_NOT_ALLOWED {
        tracing::warn!(%method, %path, "Method not allowed");

        return Err(MethodNotAllowedError::new(state.error_verbosity()).into());
    }

    Ok(resp)
}
