use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{
        attendance::AttendanceStatus,
        class::SchoolClass,
        student::{Student, StudentHistoryRow, StudentWithStatus},
    },
    store::{attendance, classes, students},
};
use actix_web::{HttpResponse, web};
use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const DEFAULT_HISTORY_DAYS: u64 = 30;
const MAX_HISTORY_DAYS: u64 = 365;

#[derive(Deserialize, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = 12)]
    pub student_id: i64,
    #[schema(example = "absent")]
    pub status: AttendanceStatus,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveAttendance {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub records: Vec<AttendanceEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct SaveAttendanceResponse {
    #[schema(example = "Attendance saved")]
    pub message: String,
    pub saved: usize,
    pub notifications_created: usize,
}

#[derive(Serialize, ToSchema)]
pub struct MyClassResponse {
    pub class: Option<SchoolClass>,
    pub students: Vec<StudentWithStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct DayAttendanceResponse {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub students: Vec<StudentWithStatus>,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// How many days back from today, 1 to 365 (default 30)
    pub days: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    #[schema(example = "2025-12-06 to 2026-01-05")]
    pub date_range: String,
    pub records: Vec<StudentHistoryRow>,
}

async fn own_class(pool: &SqlitePool, auth: &AuthUser) -> Result<Option<SchoolClass>, AppError> {
    Ok(classes::find_by_teacher(pool, auth.user_id).await?)
}

/// Teacher's class with today's status per student
#[utoipa::path(
    get,
    path = "/api/teacher/my-class",
    responses(
        (status = 200, description = "Assigned class and roster, class is null when unassigned", body = MyClassResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a teacher")
    ),
    security(("session_cookie" = [])),
    tag = "Teacher"
)]
pub async fn my_class(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    auth.require_teacher()?;

    let Some(class) = own_class(pool.get_ref(), &auth).await? else {
        return Ok(HttpResponse::Ok().json(MyClassResponse {
            class: None,
            students: Vec::new(),
        }));
    };

    let today = Local::now().date_naive();
    let students = students::roster_for_date(pool.get_ref(), class.id, today).await?;

    Ok(HttpResponse::Ok().json(MyClassResponse {
        class: Some(class),
        students,
    }))
}

/// Roster with statuses for one date
#[utoipa::path(
    get,
    path = "/api/teacher/attendance/{date}",
    params(
        ("date" = String, Path, description = "Date as YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Statuses for the date, present when unmarked", body = DayAttendanceResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a teacher")
    ),
    security(("session_cookie" = [])),
    tag = "Teacher"
)]
pub async fn get_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, AppError> {
    auth.require_teacher()?;
    let date = path.into_inner();

    let students = match own_class(pool.get_ref(), &auth).await? {
        Some(class) => students::roster_for_date(pool.get_ref(), class.id, date).await?,
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(DayAttendanceResponse { date, students }))
}

/// Save a day of attendance
#[utoipa::path(
    post,
    path = "/api/teacher/attendance",
    request_body = SaveAttendance,
    responses(
        (status = 200, description = "Attendance saved", body = SaveAttendanceResponse),
        (status = 400, description = "No class assigned, or a student is not in the class"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a teacher")
    ),
    security(("session_cookie" = [])),
    tag = "Teacher"
)]
pub async fn save_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<SaveAttendance>,
) -> Result<HttpResponse, AppError> {
    auth.require_teacher()?;

    let class = own_class(pool.get_ref(), &auth)
        .await?
        .ok_or_else(|| AppError::BadRequest("No class assigned".to_string()))?;

    let roster = students::list(pool.get_ref(), Some(class.id)).await?;
    let by_id: HashMap<i64, &Student> = roster.iter().map(|s| (s.id, s)).collect();

    let mut entries = Vec::with_capacity(payload.records.len());
    let mut outsiders = Vec::new();
    for record in &payload.records {
        match by_id.get(&record.student_id) {
            Some(student) => entries.push((*student, record.status)),
            None => outsiders.push(record.student_id.to_string()),
        }
    }

    if !outsiders.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Students not in your class: {}",
            outsiders.join(", ")
        )));
    }

    let outcome = attendance::save_for_class(
        pool.get_ref(),
        class.id,
        auth.user_id,
        payload.date,
        &entries,
    )
    .await?;

    info!(
        teacher_id = auth.user_id,
        class_id = class.id,
        date = %payload.date,
        saved = outcome.saved,
        "Attendance submitted"
    );

    Ok(HttpResponse::Ok().json(SaveAttendanceResponse {
        message: "Attendance saved".to_string(),
        saved: outcome.saved,
        notifications_created: outcome.notifications_created,
    }))
}

/// Recent attendance for the teacher's class
#[utoipa::path(
    get,
    path = "/api/teacher/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Roster joined with attendance in the window", body = HistoryResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a teacher")
    ),
    security(("session_cookie" = [])),
    tag = "Teacher"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_teacher()?;

    let days = query
        .days
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, MAX_HISTORY_DAYS);
    let end = Local::now().date_naive();
    let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);

    let records = match own_class(pool.get_ref(), &auth).await? {
        Some(class) => students::history(pool.get_ref(), class.id, start, end).await?,
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(HistoryResponse {
        date_range: format!("{} to {}", start, end),
        records,
    }))
}
