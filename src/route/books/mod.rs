use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::{middleware::require_bearer::require_bearer, state::ApiState};

pub mod get_all_books;
pub mod get_book;
pub mod get_hello;
pub mod update_book;

/// Book routes, to be nested under `/books`.
///
/// Everything but `/hello` sits behind [`require_bearer`].
pub fn app(state: ApiState) -> Router<ApiState> {
    let protected = Router::<ApiState>::new()
        .route(
            "/",
            get(get_all_books::get_all_books).post(update_book::update_book),
        )
        .route("/:id", get(get_book::get_book))
        .route_layer(from_fn_with_state(state, require_bearer));

    Router::<ApiState>::new()
        .route("/hello", get(get_hello::get_hello))
        .merge(protected)
}
