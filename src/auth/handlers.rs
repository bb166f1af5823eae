use crate::{
    auth::{
        auth::{AuthUser, authenticate},
        session::SessionStore,
    },
    config::Config,
    error::AppError,
    models::{LoginReqDto, MessageResponse, UserResponse},
};
use actix_web::{
    HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite},
    web,
};
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

/// Login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = UserResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, sessions, config, payload),
    fields(username = %payload.username)
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::BadRequest(
            "Username or password required".to_string(),
        ));
    }

    let user = match authenticate(pool.get_ref(), &payload.username, &payload.password).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials");
            return Err(AppError::InvalidCredentials);
        }
    };

    debug!(user_id = user.id, "Creating session");
    let token = sessions.create(user.id).await;

    let cookie = Cookie::build(config.session_cookie.clone(), token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    info!(user_id = user.id, role = %user.role, "Login successful");

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(UserResponse::from(&user)))
}

/// Logout
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session removed (also when none existed)", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
    config: web::Data<Config>,
) -> HttpResponse {
    if let Some(cookie) = req.cookie(&config.session_cookie) {
        sessions.remove(cookie.value()).await;
    }

    let mut removal = Cookie::build(config.session_cookie.clone(), "")
        .path("/")
        .finish();
    removal.make_removal();

    HttpResponse::Ok()
        .cookie(removal)
        .json(MessageResponse::new("Logged out"))
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The logged in user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(&auth))
}
