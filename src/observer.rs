use std::sync::Arc;

use crate::types::book::Book;

/// Receives the operational events of the book routes.
pub trait BooksObserver: Send + Sync {
    fn books_listed(&self, books: &[Book]);
}

pub trait BooksObserverProvider {
    /// Returns the injected books observer.
    fn books_observer(&self) -> Arc<dyn BooksObserver>;
}

/// Writes the events to the [`tracing`] subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingBooksObserver;

impl BooksObserver for TracingBooksObserver {
    fn books_listed(&self, books: &[Book]) {
        tracing::info!(count = books.len(), ?books, "Books listed");
    }
}
