use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    extractor::path::ApiPath,
    service::BookServiceProvider,
    state::ApiState,
    types::{book::Book, book_id::BookId},
};

#[derive(Debug)]
pub struct GetBookResponse(pub Book);

impl IntoResponse for GetBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Book identifier, forwarded as is")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 401, description = "Missing or rejected bearer token"),
        (status = 404, description = "The service does not know the book")
    )
)]
pub async fn get_book(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<BookId>,
) -> Result<GetBookResponse, ApiError> {
    let book = state
        .book_service()
        .get_book(&id)
        .await
        .map_err(|err| err.into_api_error(state.error_verbosity()))?;

    Ok(GetBookResponse(book))
}
