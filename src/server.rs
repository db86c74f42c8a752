use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::{middleware, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    decompression::RequestDecompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        jwt::{JwtAuthenticator, JwtConfig},
        static_token::{StaticToken, StaticTokenAuthenticator},
        BearerAuthenticator,
    },
    error::ErrorVerbosity,
    middleware::{
        method_not_allowed::method_not_allowed, not_found::not_found,
        trace_headers::trace_headers, trace_response_body::trace_response_body,
    },
    observer::TracingBooksObserver,
    openapi::{ApiDoc, OPENAPI_JSON_PATH},
    route,
    service::in_memory::{InMemoryBookService, DEFAULT_GREETING},
    state::ApiState,
    types::book::Book,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    StaticTokens { tokens: Vec<StaticToken> },
    Jwt(JwtConfig),
}

impl AuthConfig {
    async fn into_authenticator(self) -> anyhow::Result<Arc<dyn BearerAuthenticator>> {
        let authenticator: Arc<dyn BearerAuthenticator> = match self {
            AuthConfig::StaticTokens { tokens } => {
                Arc::new(StaticTokenAuthenticator::new(tokens))
            }
            AuthConfig::Jwt(config) => Arc::new(
                JwtAuthenticator::from_config(config)
                    .await
                    .context("Failed to create JWT authenticator")?,
            ),
        };

        Ok(authenticator)
    }
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    socket_address: SocketAddr,
    error_verbosity: ErrorVerbosity,
    #[serde(default)]
    trace_response_body: bool,
    auth: AuthConfig,
    #[serde(default = "default_greeting")]
    greeting: String,
    /// Books the in-memory service starts with.
    #[serde(default)]
    books: Vec<Book>,
}

impl ServerConfig {
    pub async fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let ServerConfig {
            socket_address,
            error_verbosity,
            trace_response_body,
            auth,
            greeting,
            books,
        } = self.config;

        tracing::info!(?error_verbosity, books = books.len(), "Building state");

        let state = ApiState::new(
            error_verbosity,
            auth.into_authenticator().await?,
            Arc::new(InMemoryBookService::new(greeting, books)),
            Arc::new(TracingBooksObserver),
        );

        let app = app(state, trace_response_body);

        tracing::info!(addr = %socket_address, "Starting server");

        let listener = TcpListener::bind(&socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

        Ok(())
    }
}

/// Builds the whole application router.
pub(crate) fn app(state: ApiState, trace_response_body_enabled: bool) -> Router {
    let mut router = Router::<ApiState>::new()
        .nest("/books", route::books::app(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new(OPENAPI_JSON_PATH).path("/rapidoc"))
        .fallback(not_found::<ApiState>)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            method_not_allowed::<ApiState>,
        ))
        .layer(middleware::from_fn(trace_headers));

    if trace_response_body_enabled {
        router = router.layer(middleware::from_fn_with_state(
            state.clone(),
            trace_response_body::<ApiState>,
        ));
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            )
            .layer(RequestDecompressionLayer::new())
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive()),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "Failed to install CTRL+C signal handler");

            std::future::pending::<()>().await;
        }

        tracing::info!("CTRL+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;

                tracing::info!("SIGTERM received");
            }
            Err(err) => {
                tracing::error!(%err, "Failed to install SIGTERM signal handler");

                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
