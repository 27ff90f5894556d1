use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use tracing::warn;
use wardgate_application::RequestContext;
use wardgate_core::{AppError, SessionIdentity};
use wardgate_domain::{Role, UserId};

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key under which the identity service stores the logged-in user.
pub const SESSION_IDENTITY_KEY: &str = "identity";

pub async fn require_identity(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<SessionIdentity>(SESSION_IDENTITY_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let context = request_context(&identity)?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Builds the authorization context for a stored identity.
///
/// An unrecognized role is treated as holding no permissions at all.
pub fn request_context(identity: &SessionIdentity) -> Result<RequestContext, AppError> {
    let role = Role::from_str(identity.role()).inspect_err(|_| {
        warn!(
            user_id = identity.user_id(),
            role = identity.role(),
            "session carries an unknown role"
        );
    })?;

    Ok(RequestContext::new(role, UserId::new(identity.user_id())))
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        check_same_origin(request.headers(), &state.frontend_url)?;
    }

    Ok(next.run(request).await)
}

fn check_same_origin(headers: &HeaderMap, allowed_origin: &str) -> Result<(), AppError> {
    if let Some(fetch_site) = headers.get("sec-fetch-site") {
        if fetch_site == HeaderValue::from_static("cross-site") {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()));
        }
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let allowed_origin = allowed_origin.trim_end_matches('/');
    if origin != allowed_origin && !referer_has_origin(referer, allowed_origin) {
        return Err(AppError::Unauthorized("origin validation failed".to_owned()));
    }

    Ok(())
}

/// The referer must be the origin itself or a URL whose authority ends there.
fn referer_has_origin(referer: &str, origin: &str) -> bool {
    referer
        .strip_prefix(origin)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
