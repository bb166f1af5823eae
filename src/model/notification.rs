use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub message: Option<String>,
    pub status: NotificationStatus,
}

/// Notification joined with the student and class it concerns.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct NotificationView {
    #[schema(example = 1)]
    pub id: i64,
    pub student_id: i64,
    #[schema(example = "Student 6-A-01")]
    pub student_name: String,
    pub class_id: i64,
    #[schema(example = "6-A")]
    pub class_name: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: NotificationStatus,
    pub message: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
}
