use axum::async_trait;
use tokio::sync::RwLock;

use crate::types::{book::Book, book_id::BookId};

use super::{BookService, BookServiceError};

pub const DEFAULT_GREETING: &str = "Hello World!";

/// A [`BookService`] keeping its books in memory.
///
/// Books are matched by their `id` field. Books without one can be listed but never fetched.
pub struct InMemoryBookService {
    greeting: String,
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookService {
    pub fn new(greeting: String, books: Vec<Book>) -> Self {
        Self {
            greeting,
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl BookService for InMemoryBookService {
    async fn get_hello(&self) -> String {
        self.greeting.clone()
    }

    async fn get_all_books(&self) -> Result<Vec<Book>, BookServiceError> {
        Ok(self.books.read().await.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn get_book(&self, id: &BookId) -> Result<Book, BookServiceError> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id().as_ref() == Some(id))
            .cloned()
            .ok_or_else(|| BookServiceError::NotFound { id: id.clone() })
    }

    #[tracing::instrument(skip_all)]
    async fn update_book(&self, book: Book) -> Result<Book, BookServiceError> {
        let mut books = self.books.write().await;

        let position = book
            .id()
            .and_then(|id| books.iter().position(|stored| stored.id() == Some(id.clone())));

        match position {
            Some(position) => {
                tracing::debug!(id = ?book.id(), "Replacing book");

                books[position] = book.clone();
            }
            None => {
                tracing::debug!(id = ?book.id(), "Adding book");

                books.push(book.clone());
            }
        }

        Ok(book)
    }
}
