use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attendance::AttendanceStatus;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name_en": "Ali Khan",
    "name_ur": "علی خان",
    "roll_no": "01",
    "class_id": 1,
    "parent_phone": "0300-1000000"
}))]
pub struct Student {
    pub id: i64,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub roll_no: String,
    pub class_id: i64,
    pub parent_phone: Option<String>,
}

pub struct NewStudent<'a> {
    pub name_en: &'a str,
    pub name_ur: Option<&'a str>,
    pub roll_no: &'a str,
    pub class_id: i64,
    pub parent_phone: Option<&'a str>,
}

/// Roster entry with the status for one day, "present" when nothing is stored.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct StudentWithStatus {
    pub id: i64,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub roll_no: String,
    pub status: AttendanceStatus,
}

/// Roster entry joined with one attendance row from a date range, if any.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct StudentHistoryRow {
    pub id: i64,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub roll_no: String,
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}
