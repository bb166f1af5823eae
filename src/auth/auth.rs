use crate::{
    auth::password::verify_password,
    error::AppError,
    model::{role::Role, user::User},
    store::users,
};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use sqlx::SqlitePool;
use tracing::debug;

/// The caller behind a live session, placed in request extensions by
/// [`crate::auth::middleware::session_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub name_en: String,
    pub name_ur: Option<String>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            role: user.role,
            name_en: user.name_en,
            name_ur: user.name_ur,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized.into()),
        )
    }
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_role(&[Role::Admin])
    }

    pub fn require_principal(&self) -> Result<(), AppError> {
        self.require_role(&[Role::Principal])
    }

    pub fn require_teacher(&self) -> Result<(), AppError> {
        self.require_role(&[Role::Teacher])
    }
}

/// Returns the user when the password matches its stored hash.
///
/// An unknown username and a wrong password both produce `Ok(None)`.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>, sqlx::Error> {
    let Some(user) = users::find_by_username(pool, username).await? else {
        debug!("No such user");
        return Ok(None);
    };

    match verify_password(password, &user.password) {
        Ok(()) => Ok(Some(user)),
        Err(e) => {
            debug!(error = %e, "Password mismatch");
            Ok(None)
        }
    }
}
