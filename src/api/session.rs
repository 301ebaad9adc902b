use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::middleware::AppState;
use crate::models::{LoginRequest, User};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub logged_in: bool,
    pub user: Option<User>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Current session
#[utoipa::path(
    get,
    path = "/api/v1/session",
    tag = "session",
    responses(
        (status = 200, description = "Current user, if logged in", body = SessionResponse)
    )
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let user = state.session.current_user().await;
    Json(SessionResponse {
        logged_in: user.is_some(),
        user,
    })
}

/// Log in as the owner or as a tenant
#[utoipa::path(
    post,
    path = "/api/v1/session/login",
    tag = "session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = User),
        (status = 400, description = "Login failed")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<User>> {
    let user = state.session.login(payload.role).await?;
    Ok(Json(user))
}

/// Log out
#[utoipa::path(
    post,
    path = "/api/v1/session/logout",
    tag = "session",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.session.logout().await?;
    Ok(Json(json!({"success": true})))
}
