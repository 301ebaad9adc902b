use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::services::{RentalStore, SessionService, SmsService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RentalStore>,
    pub session: Arc<SessionService>,
    pub sms: Arc<SmsService>,
    pub config: Config,
}

/// The logged-in user of this instance.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

pub fn require_owner(user: &User) -> AppResult<()> {
    if user.is_owner() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn require_tenant(user: &User) -> AppResult<()> {
    if user.is_tenant() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

// Makes AppState reachable from request extensions
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(state);
    next.run(request).await
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let app_state = parts.extensions.get::<AppState>().cloned().ok_or_else(|| {
            AppError::Internal("session middleware is not installed".to_string()).into_response()
        })?;

        match app_state.session.current_user().await {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(AppError::Unauthorized.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: "u1".into(),
            name: "U".into(),
            phone: "9999999999".into(),
            role,
            aadhaar_number: None,
        }
    }

    #[test]
    fn role_guards() {
        assert!(require_owner(&user(UserRole::Owner)).is_ok());
        assert!(matches!(
            require_owner(&user(UserRole::Tenant)),
            Err(AppError::Forbidden)
        ));
        assert!(require_tenant(&user(UserRole::Tenant)).is_ok());
        assert!(require_tenant(&user(UserRole::Broker)).is_err());
    }
}
