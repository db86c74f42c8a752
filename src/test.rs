use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    auth::{
        static_token::{StaticToken, StaticTokenAuthenticator},
        AuthError, BearerAuthenticator,
    },
    error::ErrorVerbosity,
    observer::BooksObserver,
    server::{app, ServerConfig},
    service::{BookService, BookServiceError},
    state::ApiState,
    types::{book::Book, book_id::BookId, principal::Principal},
};

const TOKEN: &str = "valid-token";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    GetHello,
    GetAllBooks,
    GetBook(BookId),
    UpdateBook(Book),
}

/// Records every call and answers with canned values.
#[derive(Default)]
struct RecordingBookService {
    calls: Mutex<Vec<Call>>,
    missing: bool,
    failing: bool,
}

impl RecordingBookService {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), BookServiceError> {
        if self.failing {
            return Err(anyhow::anyhow!("storage unavailable").into());
        }

        Ok(())
    }
}

fn all_books() -> Vec<Book> {
    vec![
        Book(json!({ "id": 1, "title": "Dune" })),
        Book(json!({ "anything": ["goes", 2] })),
    ]
}

#[async_trait]
impl BookService for RecordingBookService {
    async fn get_hello(&self) -> String {
        self.record(Call::GetHello);

        "Hello World!".to_string()
    }

    async fn get_all_books(&self) -> Result<Vec<Book>, BookServiceError> {
        self.record(Call::GetAllBooks);
        self.check()?;

        Ok(all_books())
    }

    async fn get_book(&self, id: &BookId) -> Result<Book, BookServiceError> {
        self.record(Call::GetBook(id.clone()));
        self.check()?;

        if self.missing {
            return Err(BookServiceError::NotFound { id: id.clone() });
        }

        Ok(Book(json!({ "id": id.0, "from": "service" })))
    }

    async fn update_book(&self, book: Book) -> Result<Book, BookServiceError> {
        self.record(Call::UpdateBook(book.clone()));
        self.check()?;

        Ok(Book(json!({ "updated": book.0 })))
    }
}

#[derive(Default)]
struct RecordingObserver {
    listed: Mutex<Vec<Vec<Book>>>,
}

impl BooksObserver for RecordingObserver {
    fn books_listed(&self, books: &[Book]) {
        self.listed.lock().unwrap().push(books.to_vec());
    }
}

struct Harness {
    app: Router,
    service: Arc<RecordingBookService>,
    observer: Arc<RecordingObserver>,
}

/// Fails every authentication with the error it was built with.
struct FailingAuthenticator(fn() -> AuthError);

#[async_trait]
impl BearerAuthenticator for FailingAuthenticator {
    async fn authenticate(&self, _token: &str) -> Result<Principal, AuthError> {
        Err((self.0)())
    }
}

impl Harness {
    fn with_service(service: RecordingBookService) -> Self {
        Self::build(
            service,
            Arc::new(StaticTokenAuthenticator::new([StaticToken {
                token: TOKEN.to_string(),
                subject: "tester".to_string(),
            }])),
        )
    }

    fn with_authenticator(authenticator: Arc<dyn BearerAuthenticator>) -> Self {
        Self::build(RecordingBookService::default(), authenticator)
    }

    fn build(service: RecordingBookService, authenticator: Arc<dyn BearerAuthenticator>) -> Self {
        let service = Arc::new(service);
        let observer = Arc::new(RecordingObserver::default());

        let state = ApiState::new(
            ErrorVerbosity::Full,
            authenticator,
            service.clone(),
            observer.clone(),
        );

        Self {
            app: app(state, false),
            service,
            observer,
        }
    }

    fn new() -> Self {
        Self::with_service(RecordingBookService::default())
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match body {
        Some(body) => {
            builder = builder.header(CONTENT_TYPE, "application/json");

            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

#[tokio::test]
async fn example_config_is_valid() {
    ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");
}

#[tokio::test]
async fn hello_needs_no_credential() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::GET, "/books/hello", None, None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Hello World!");
    assert_eq!(harness.service.calls(), vec![Call::GetHello]);
}

#[tokio::test]
async fn hello_ignores_a_bad_credential() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::GET, "/books/hello", Some("nope"), None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Hello World!");
}

#[tokio::test]
async fn protected_routes_reject_without_calling_the_service() {
    let harness = Harness::new();

    let requests = [
        request(Method::GET, "/books", None, None),
        request(Method::GET, "/books/1", None, None),
        request(Method::POST, "/books", None, Some(json!({ "id": 1 }))),
        request(Method::GET, "/books", Some("wrong"), None),
        request(Method::GET, "/books/1", Some("wrong"), None),
        request(Method::POST, "/books", Some("wrong"), Some(json!({ "id": 1 }))),
    ];

    for request in requests {
        let uri = request.uri().clone();

        let response = harness.send(request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Bearer",
            "{uri}"
        );

        let body = body_json(response).await;
        assert_eq!(body["error_type"], "Bearer", "{uri}");
    }

    assert!(harness.service.calls().is_empty());
    assert!(harness.observer.listed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let harness = Harness::new();

    let request = Request::builder()
        .uri("/books")
        .header(AUTHORIZATION, format!("Basic {TOKEN}"))
        .body(Body::empty())
        .unwrap();

    let response = harness.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["bearer_error_type"], "InvalidBearer");
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    let harness = Harness::new();

    let request = Request::builder()
        .uri("/books")
        .header(AUTHORIZATION, format!("bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();

    let response = harness.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.service.calls(), vec![Call::GetAllBooks]);
}

#[tokio::test]
async fn expired_credential_is_unauthorized() {
    let harness =
        Harness::with_authenticator(Arc::new(FailingAuthenticator(|| AuthError::Expired)));

    let response = harness
        .send(request(Method::GET, "/books/1", Some(TOKEN), None))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

    let body = body_json(response).await;
    assert_eq!(body["error_type"], "Bearer");
    assert_eq!(body["error"]["bearer_error_type"], "Expired");
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn authenticator_failure_is_an_internal_error() {
    let harness = Harness::with_authenticator(Arc::new(FailingAuthenticator(|| {
        AuthError::Internal(anyhow::anyhow!("key server unreachable"))
    })));

    let response = harness
        .send(request(Method::POST, "/books", Some(TOKEN), Some(json!({ "id": 1 }))))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error_type"], "InternalServerError");
    assert!(body["error"]["internal_server_error"]
        .as_str()
        .unwrap()
        .contains("key server unreachable"));
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn list_returns_service_collection_verbatim() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::GET, "/books", Some(TOKEN), None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{ "id": 1, "title": "Dune" }, { "anything": ["goes", 2] }])
    );
    assert_eq!(harness.service.calls(), vec![Call::GetAllBooks]);
    assert_eq!(*harness.observer.listed.lock().unwrap(), vec![all_books()]);
}

#[tokio::test]
async fn fetch_forwards_the_identifier_as_a_scalar() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::GET, "/books/abc-42", Some(TOKEN), None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "id": "abc-42", "from": "service" })
    );
    assert_eq!(
        harness.service.calls(),
        vec![Call::GetBook(BookId("abc-42".to_string()))]
    );
}

#[tokio::test]
async fn fetch_decodes_percent_encoded_identifiers() {
    let harness = Harness::new();

    harness
        .send(request(Method::GET, "/books/a%20b", Some(TOKEN), None))
        .await;

    assert_eq!(
        harness.service.calls(),
        vec![Call::GetBook(BookId("a b".to_string()))]
    );
}

#[tokio::test]
async fn update_forwards_payload_verbatim() {
    let harness = Harness::new();
    let payload = json!({ "id": 7, "title": "Solaris", "tags": ["sf"], "nested": { "x": null } });

    let response = harness
        .send(request(
            Method::POST,
            "/books",
            Some(TOKEN),
            Some(payload.clone()),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "updated": payload }));
    assert_eq!(
        harness.service.calls(),
        vec![Call::UpdateBook(Book(payload))]
    );
}

#[tokio::test]
async fn update_accepts_any_json_value() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::POST, "/books", Some(TOKEN), Some(json!(42))))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "updated": 42 }));
}

#[tokio::test]
async fn update_rejects_a_body_that_is_not_json() {
    let harness = Harness::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = harness.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error_type"], "Body");
    assert!(harness.service.calls().is_empty());
}

#[tokio::test]
async fn service_not_found_maps_to_404() {
    let harness = Harness::with_service(RecordingBookService {
        missing: true,
        ..Default::default()
    });

    let response = harness
        .send(request(Method::GET, "/books/9", Some(TOKEN), None))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error_type"], "NotFound");
    assert_eq!(body["error"]["not_found_reason"], "Book 9 not found");
}

#[tokio::test]
async fn service_failure_maps_to_500() {
    let harness = Harness::with_service(RecordingBookService {
        failing: true,
        ..Default::default()
    });

    let response = harness
        .send(request(Method::GET, "/books", Some(TOKEN), None))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error_type"], "InternalServerError");
    assert!(harness.observer.listed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::GET, "/authors", None, None))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_type"], "NotFound");
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::DELETE, "/books/hello", None, None))
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["error_type"], "MethodNotAllowed");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let harness = Harness::new();

    let response = harness
        .send(request(Method::GET, "/api-docs/openapi.json", None, None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["paths"]["/books/{id}"]["get"].is_object());
}
