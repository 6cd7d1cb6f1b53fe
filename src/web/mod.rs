//! HTTP boundary for the catalogue.
//!
//! Handlers translate requests into coordinator calls and map the
//! [`BookError`] taxonomy onto status codes. No business rule lives here.

pub mod dto;
pub mod handlers;

use crate::coordinator::BookCoordinator;
use crate::core::{BookError, RequestContext};
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use std::any::Any;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct WebError(pub BookError);

impl From<BookError> for WebError {
    fn from(err: BookError) -> Self {
        WebError(err)
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookError::NotFound(_) => StatusCode::NOT_FOUND,
            BookError::AlreadyExists(_) => StatusCode::CONFLICT,
            BookError::Validation(_) => StatusCode::BAD_REQUEST,
            BookError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            BookError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            BookError::Database(_) | BookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            BookError::NotFound(msg)
            | BookError::AlreadyExists(msg)
            | BookError::Validation(msg)
            | BookError::Database(msg)
            | BookError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: self.0.code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: BookCoordinator,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(coordinator: BookCoordinator, request_timeout: Option<Duration>) -> Self {
        Self {
            coordinator,
            request_timeout,
        }
    }

    /// Fresh context for one request. Dropping the handler future on client
    /// disconnect abandons any in-flight collaborator call.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_optional_timeout(self.request_timeout)
    }
}

/// Builds the `/api/v1/books` routes plus `/health`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/books", post(handlers::create_book).get(handlers::list_books))
        .route(
            "/books/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route("/stats", get(handlers::stats));

    let routes = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(state);

    with_middleware(routes)
}

fn with_middleware(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// A panicking handler answers 500 with the usual error body instead of
/// dropping the connection.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(details, "handler panicked");

    WebError(BookError::Internal("internal server error".to_string())).into_response()
}
