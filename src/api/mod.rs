//! API handlers for the lending ledger REST endpoints

pub mod books;
pub mod events;
pub mod health;
pub mod ledger;
pub mod loans;
pub mod members;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::identity::CallerIdentity, AppState};

/// Extractor for the caller identity forwarded by the connectivity layer.
///
/// The header is trusted as already authenticated; a missing or blank value
/// rejects the request with `Unauthenticated`.
pub struct AuthenticatedCaller(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(state.config.server.identity_header.as_str())
            .and_then(|value| value.to_str().ok());

        state
            .services
            .identity
            .resolve_caller(presented)
            .map(AuthenticatedCaller)
    }
}

/// JSON body extractor whose rejections use the ledger error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Path extractor whose rejections use the ledger error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);

/// Query extractor whose rejections use the ledger error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let openapi = openapi::create_openapi_router(&state.config.server.identity_header);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Ledger
        .route("/ledger", get(ledger::summary))
        // Caller
        .route("/me", get(members::me))
        .route("/me/borrowings", get(loans::my_borrowings))
        // Members
        .route("/members", get(members::list_members).post(members::register))
        // Catalog
        .route("/books", get(books::list_books).post(books::add_book))
        .route("/books/:id", get(books::get_book_details).put(books::update_book))
        .route("/books/:id/availability", get(books::get_availability))
        // Borrowing
        .route("/books/:id/borrow", post(loans::borrow_book))
        .route("/books/:id/return", post(loans::return_book))
        // Event log
        .route("/events", get(events::list_events))
        .route("/events/stream", get(events::stream_events))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
