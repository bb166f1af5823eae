use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{
        notification::NotificationStatus,
        role::Role,
    },
    store::notifications,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct NotificationFilter {
    /// pending or sent
    #[param(value_type = Option<String>)]
    pub status: Option<NotificationStatus>,
}

/// List absence notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationFilter),
    responses(
        (status = 200, description = "Newest first", body = [crate::model::notification::NotificationView]),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Not a principal or teacher")
    ),
    security(("session_cookie" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<NotificationFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_role(&[Role::Principal, Role::Teacher])?;

    let rows = notifications::list(pool.get_ref(), query.status).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Mark a notification as sent
#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/send",
    params(
        ("notification_id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "The notification, now sent", body = crate::model::notification::Notification),
        (status = 404, description = "Notification not found"),
        (status = 403, description = "Not a principal")
    ),
    security(("session_cookie" = [])),
    tag = "Notifications"
)]
pub async fn mark_sent(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    auth.require_principal()?;
    let notification_id = path.into_inner();

    let notification = notifications::mark_sent(pool.get_ref(), notification_id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification"))?;

    info!(notification_id, by = auth.user_id, "Notification marked as sent");
    Ok(HttpResponse::Ok().json(notification))
}
