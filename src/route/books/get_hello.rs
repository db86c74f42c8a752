use axum::extract::State;

use crate::{service::BookServiceProvider, state::ApiState};

/// Returns the service greeting. No authentication.
#[utoipa::path(
    get,
    path = "/books/hello",
    tag = "books",
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/plain")
    )
)]
pub async fn get_hello(State(state): State<ApiState>) -> String {
    state.book_service().get_hello().await
}
