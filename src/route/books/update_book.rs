use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    extractor::json::ApiJson,
    service::BookServiceProvider,
    state::ApiState,
    types::{book::Book, principal::Principal},
};

#[derive(Debug)]
pub struct UpdateBookResponse(pub Book);

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Forwards the body to the service untouched.
///
/// Any JSON value is accepted. Only a body that is not JSON at all is rejected.
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer" = [])),
    request_body = Book,
    responses(
        (status = 200, description = "The service result", body = Book),
        (status = 400, description = "Body is not JSON"),
        (status = 401, description = "Missing or rejected bearer token")
    )
)]
pub async fn update_book(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    ApiJson(book): ApiJson<Book>,
) -> Result<UpdateBookResponse, ApiError> {
    tracing::info!(subject = %principal.subject, "Updating book");

    let book = state
        .book_service()
        .update_book(book)
        .await
        .map_err(|err| err.into_api_error(state.error_verbosity()))?;

    Ok(UpdateBookResponse(book))
}
