//! A fixed RSA key pair and a local JWKS endpoint for the JWT tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{extract::State, routing::get, Json, Router};
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const KID: &str = "book-api-test";

const PRIVATE_KEY_PEM: &str = include_str!("testdata/rsa_private_key.pem");
const MODULUS: &str = include_str!("testdata/rsa_modulus.b64u");

pub fn jwk_set_json() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": KID,
            "alg": "RS256",
            "use": "sig",
            "n": MODULUS.trim(),
            "e": "AQAB",
        }]
    })
}

pub fn jwk_set() -> JwkSet {
    serde_json::from_value(jwk_set_json()).expect("Test JWK set is invalid")
}

/// Signs `claims` with the test key using `RS256`.
pub fn sign_rs256<C: Serialize>(kid: &str, claims: &C) -> String {
    let header = Header {
        kid: Some(kid.to_string()),
        ..Header::new(Algorithm::RS256)
    };

    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).expect("Test key is invalid");

    encode(&header, claims, &key).expect("Failed to sign test token")
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build HTTP client")
}

#[derive(Clone)]
struct EndpointState {
    fetches: Arc<AtomicUsize>,
    empty_first: bool,
}

/// A JWKS endpoint on a random local port that counts its fetches.
pub struct JwksEndpoint {
    pub uri: String,
    fetches: Arc<AtomicUsize>,
}

impl JwksEndpoint {
    /// With `empty_first`, the first fetch answers an empty key set.
    pub async fn spawn(empty_first: bool) -> Self {
        let fetches = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route("/jwks", get(serve_jwks))
            .with_state(EndpointState {
                fetches: fetches.clone(),
                empty_first,
            });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind JWKS endpoint");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("JWKS endpoint failed");
        });

        Self {
            uri: format!("http://{addr}/jwks"),
            fetches,
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

async fn serve_jwks(State(state): State<EndpointState>) -> Json<Value> {
    let previous = state.fetches.fetch_add(1, Ordering::SeqCst);

    if state.empty_first && previous == 0 {
        return Json(json!({ "keys": [] }));
    }

    Json(jwk_set_json())
}
