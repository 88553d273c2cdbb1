//! Borrowing endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::BookId,
        borrowing::{Borrowing, BorrowingDetails},
    },
    AppState,
};

use super::{AuthenticatedCaller, ValidPath};

/// Borrow one copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "loans",
    security(("caller_identity" = [])),
    params(
        ("id" = u64, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = Borrowing),
        (status = 403, description = "Caller is not a registered member"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copy available or already borrowed by the caller")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ValidPath(book_id): ValidPath<BookId>,
) -> AppResult<(StatusCode, Json<Borrowing>)> {
    let borrowing = state.services.loans.borrow_book(&caller, book_id).await?;
    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Return the caller's copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "loans",
    security(("caller_identity" = [])),
    params(
        ("id" = u64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Borrowing),
        (status = 403, description = "Caller is not a registered member"),
        (status = 409, description = "Caller has no outstanding copy")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ValidPath(book_id): ValidPath<BookId>,
) -> AppResult<Json<Borrowing>> {
    Ok(Json(state.services.loans.return_book(&caller, book_id).await?))
}

/// The caller's borrowing history
#[utoipa::path(
    get,
    path = "/me/borrowings",
    tag = "loans",
    security(("caller_identity" = [])),
    responses(
        (status = 200, description = "Borrowings in insertion order", body = Vec<BorrowingDetails>),
        (status = 403, description = "Caller is not a registered member")
    )
)]
pub async fn my_borrowings(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    Ok(Json(state.services.loans.user_borrowing_details(&caller)?))
}
