use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    app_error::AppError,
    app_state::{AppState, SessionId},
};

pub const SESSION_HEADER: &str = "x-session-id";

const MAX_SESSION_ID_LENGTH: usize = 64;

/// Resolves the shopper session from `x-session-id` and stores it as an extension.
pub async fn cart_session(mut req: Request, next: Next) -> Result<Response, AppError> {
    let session = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| is_valid_session_id(value))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Missing or malformed {SESSION_HEADER} header"
            ))
        })?;

    let session = SessionId(session.to_owned());
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Admits requests bearing the configured admin token.
pub async fn admin_authorization(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(AppError::ForbiddenResource(
            "Admin access is not configured".into(),
        ));
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;

    if presented.as_bytes() != expected.as_bytes() {
        tracing::warn!("Rejected admin request with a wrong token");
        return Err(AppError::ForbiddenResource("Invalid admin token".into()));
    }

    Ok(next.run(req).await)
}
