use std::{ops::Deref, sync::Arc};

use crate::{
    auth::{AuthenticatorProvider, BearerAuthenticator},
    error::{ErrorVerbosity, ErrorVerbosityProvider},
    observer::{BooksObserver, BooksObserverProvider},
    service::{BookService, BookServiceProvider},
};

#[derive(Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    pub fn new(
        error_verbosity: ErrorVerbosity,
        authenticator: Arc<dyn BearerAuthenticator>,
        book_service: Arc<dyn BookService>,
        books_observer: Arc<dyn BooksObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiStateInner {
                error_verbosity,
                authenticator,
                book_service,
                books_observer,
            }),
        }
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct ApiStateInner {
    error_verbosity: ErrorVerbosity,
    authenticator: Arc<dyn BearerAuthenticator>,
    book_service: Arc<dyn BookService>,
    books_observer: Arc<dyn BooksObserver>,
}

impl ErrorVerbosityProvider for ApiState {
    fn error_verbosity(&self) -> ErrorVerbosity {
        self.error_verbosity
    }
}

impl AuthenticatorProvider for ApiState {
    fn authenticator(&self) -> Arc<dyn BearerAuthenticator> {
        self.authenticator.clone()
    }
}

impl BookServiceProvider for ApiState {
    fn book_service(&self) -> Arc<dyn BookService> {
        self.book_service.clone()
    }
}

impl BooksObserverProvider for ApiState {
    fn books_observer(&self) -> Arc<dyn BooksObserver> {
        self.books_observer.clone()
    }
}
