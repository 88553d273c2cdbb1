//! Catalog endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookDetails, BookId, BookUpdate, NewBook},
    AppState,
};

use super::{AuthenticatedCaller, ValidJson, ValidPath};

/// Availability response
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub id: BookId,
    pub available: bool,
}

/// List every book in id order
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.catalog.list_books()?))
}

/// Add a book (administrator only)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("caller_identity" = [])),
    request_body = NewBook,
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 400, description = "Empty title/author or non-positive copies"),
        (status = 403, description = "Caller is not the administrator")
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ValidJson(book): ValidJson<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.catalog.add_book(&caller, &book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = u64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_details(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<BookId>,
) -> AppResult<Json<BookDetails>> {
    Ok(Json(state.services.catalog.book_details(id)?))
}

/// Update a book (administrator only)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("caller_identity" = [])),
    params(
        ("id" = u64, Path, description = "Book ID")
    ),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or fewer copies than are on loan"),
        (status = 403, description = "Caller is not the administrator"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ValidPath(id): ValidPath<BookId>,
    ValidJson(update): ValidJson<BookUpdate>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.services.catalog.update_book(&caller, id, &update).await?))
}

/// Whether at least one copy can be borrowed
#[utoipa::path(
    get,
    path = "/books/{id}/availability",
    tag = "books",
    params(
        ("id" = u64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Availability", body = AvailabilityResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<BookId>,
) -> AppResult<Json<AvailabilityResponse>> {
    let available = state.services.catalog.is_book_available(id)?;
    Ok(Json(AvailabilityResponse { id, available }))
}
