use axum::{extract::Request, middleware::Next, response::IntoResponse};

use crate::extractor::principal::ApiPrincipal;

/// Authenticates the bearer token and puts the [`Principal`](crate::types::principal::Principal) as an extension for the next layers.
///
/// Rejects before the handler runs, so a rejected request never reaches the book service.
pub async fn require_bearer(
    ApiPrincipal(principal): ApiPrincipal,
    mut req: Request,
    next: Next,
) -> impl IntoResponse {
    tracing::debug!(subject = %principal.subject, "Bearer accepted");

    req.extensions_mut().insert(principal);

    next.run(req).await
}
