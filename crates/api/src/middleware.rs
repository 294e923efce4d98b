//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use nightline_common::{AppError, config::InstanceConfig};
use nightline_core::{EventService, SessionService, SupportService, UserService};

use crate::extractors::SessionToken;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub session_service: SessionService,
    pub event_service: EventService,
    pub support_service: SupportService,
    pub instance: InstanceConfig,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// Resolves the bearer token to its session user and stores both in the
/// request extensions. Requests without the header pass through anonymously;
/// a header that is not a bearer token is rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => match value.to_str().ok().and_then(bearer_token) {
            Some(token) => Some(token.to_string()),
            None => {
                return AppError::BadRequest("Malformed Authorization header".to_string())
                    .into_response();
            }
        },
    };

    if let Some(token) = token {
        match state.session_service.resolve(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
                req.extensions_mut().insert(SessionToken(token));
            }
            Ok(None) => tracing::debug!("Unknown or expired session token"),
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
