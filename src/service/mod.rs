use std::sync::Arc;

use axum::async_trait;

use crate::{
    error::{ApiError, ErrorVerbosity, InternalServerError, NotFoundError},
    types::{book::Book, book_id::BookId},
};

pub mod in_memory;

#[derive(Debug, thiserror::Error)]
pub enum BookServiceError {
    #[error("Book {id} not found")]
    NotFound { id: BookId },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookServiceError {
    pub fn into_api_error(self, verbosity: ErrorVerbosity) -> ApiError {
        match self {
            BookServiceError::NotFound { .. } => {
                NotFoundError::with_reason(verbosity, self.to_string()).into()
            }
            BookServiceError::Internal(err) => {
                InternalServerError::from_generic_error(verbosity, err).into()
            }
        }
    }
}

/// Holds the business logic behind the book routes.
///
/// Results are returned to the caller unmodified.
#[async_trait]
pub trait BookService: Send + Sync {
    async fn get_hello(&self) -> String;

    async fn get_all_books(&self) -> Result<Vec<Book>, BookServiceError>;

    async fn get_book(&self, id: &BookId) -> Result<Book, BookServiceError>;

    async fn update_book(&self, book: Book) -> Result<Book, BookServiceError>;
}

pub trait BookServiceProvider {
    /// Returns the injected book service.
    fn book_service(&self) -> Arc<dyn BookService>;
}
