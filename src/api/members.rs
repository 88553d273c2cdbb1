//! Member registration endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{identity::Caller, member::Member},
    AppState,
};

use super::AuthenticatedCaller;

/// Registration response
#[derive(Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub member: Member,
    /// Id of the `UserRegistered` event
    pub event_id: u64,
}

/// Register the caller as a member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("caller_identity" = [])),
    responses(
        (status = 201, description = "Caller registered", body = RegistrationResponse),
        (status = 401, description = "No caller identity"),
        (status = 409, description = "Caller already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<(StatusCode, Json<RegistrationResponse>)> {
    let record = state.services.identity.register(&caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            member: Member {
                address: caller,
                registered: true,
            },
            event_id: record.id,
        }),
    ))
}

/// List all registered members in registration order
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses(
        (status = 200, description = "Registered members", body = Vec<Member>)
    )
)]
pub async fn list_members(State(state): State<AppState>) -> AppResult<Json<Vec<Member>>> {
    Ok(Json(state.services.identity.all_members()?))
}

/// Registration and administrator status of the caller
#[utoipa::path(
    get,
    path = "/me",
    tag = "members",
    security(("caller_identity" = [])),
    responses(
        (status = 200, description = "Caller status", body = Caller),
        (status = 401, description = "No caller identity")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Caller>> {
    Ok(Json(state.services.identity.caller(&caller)?))
}
