use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::AppState;

/// Id of the user a request acts as, inserted by [`resolve_user`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Resolve the caller from `Authorization: Bearer <token>`.
///
/// Requests without a token, or with one the identity provider rejects, act as
/// the configured default user.
pub async fn resolve_user(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    let user_id = match token {
        Some(token) => match state.identity.verify_token(&token).await {
            Ok(user_id) => user_id,
            Err(err) => {
                debug!(target: "travel::http", error = %err, "token rejected, using default user");
                state.default_user.clone()
            }
        },
        None => state.default_user.clone(),
    };

    request.extensions_mut().insert(CurrentUser(user_id));
    next.run(request).await
}
