use crate::auth::{auth::AuthUser, session::SessionStore};
use crate::config::Config;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use sqlx::SqlitePool;

/// Resolves the session cookie to a user and stores it as [`AuthUser`].
/// Requests without a live session are answered with 401 here.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let (config, sessions, pool) = match (
        req.app_data::<Data<Config>>().cloned(),
        req.app_data::<Data<SessionStore>>().cloned(),
        req.app_data::<Data<SqlitePool>>().cloned(),
    ) {
        (Some(c), Some(s), Some(p)) => (c, s, p),
        _ => {
            let resp = AppError::Internal("App state missing".to_string()).error_response();
            return Ok(req.into_response(resp));
        }
    };

    let token = match req.cookie(&config.session_cookie) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            return Ok(req.into_response(AppError::Unauthorized.error_response()));
        }
    };

    let user = match sessions.resolve_user(pool.get_ref(), &token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(req.into_response(AppError::Unauthorized.error_response()));
        }
        Err(e) => {
            return Ok(req.into_response(AppError::from(e).error_response()));
        }
    };

    req.extensions_mut().insert(AuthUser::from(user));

    next.call(req).await
}
