//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, events, health, ledger, loans, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lending Ledger API",
        version = "0.1.0",
        description = "Catalog, membership and borrowing ledger REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Ledger
        ledger::summary,
        // Members
        members::register,
        members::list_members,
        members::me,
        // Books
        books::list_books,
        books::add_book,
        books::get_book_details,
        books::update_book,
        books::get_availability,
        // Loans
        loans::borrow_book,
        loans::return_book,
        loans::my_borrowings,
        // Events
        events::list_events,
        events::stream_events,
    ),
    components(
        schemas(
            // Members
            crate::models::identity::CallerIdentity,
            crate::models::identity::Caller,
            crate::models::member::Member,
            members::RegistrationResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::NewBook,
            crate::models::book::BookUpdate,
            books::AvailabilityResponse,
            // Loans
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowingState,
            crate::models::borrowing::BorrowingDetails,
            // Events
            crate::models::event::LedgerEvent,
            crate::models::event::EventRecord,
            // Ledger
            crate::models::ledger::LedgerSummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "ledger", description = "Ledger summary"),
        (name = "members", description = "Member registration"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Borrowing and returning"),
        (name = "events", description = "Event log feed")
    )
)]
pub struct ApiDoc;

/// Documents the identity header set by the authenticating proxy
struct CallerIdentityScheme<'a> {
    header: &'a str,
}

impl Modify for CallerIdentityScheme<'_> {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "caller_identity",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(self.header))),
            );
        }
    }
}

/// Create the OpenAPI documentation router.
///
/// `identity_header` is the header the caller extractor reads, so the
/// documented scheme follows `server.identity_header`.
pub fn create_openapi_router(identity_header: &str) -> Router {
    let mut doc = ApiDoc::openapi();
    CallerIdentityScheme {
        header: identity_header,
    }
    .modify(&mut doc);

    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc))
}
