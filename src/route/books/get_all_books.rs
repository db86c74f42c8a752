use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    observer::BooksObserverProvider,
    service::BookServiceProvider,
    state::ApiState,
    types::book::Book,
};

#[derive(Debug)]
pub struct GetAllBooksResponse(pub Vec<Book>);

impl IntoResponse for GetAllBooksResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Returns every book the service holds, unfiltered.
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All books", body = [Book]),
        (status = 401, description = "Missing or rejected bearer token")
    )
)]
pub async fn get_all_books(State(state): State<ApiState>) -> Result<GetAllBooksResponse, ApiError> {
    let books = state
        .book_service()
        .get_all_books()
        .await
        .map_err(|err| err.into_api_error(state.error_verbosity()))?;

    state.books_observer().books_listed(&books);

    Ok(GetAllBooksResponse(books))
}
