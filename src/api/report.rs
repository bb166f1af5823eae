use crate::{
    auth::auth::AuthUser,
    error::AppError,
    report::{
        dashboard, export,
        monthly::{self, MonthRange},
        student,
    },
};
use actix_web::{HttpResponse, http::header, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Day to summarize as YYYY-MM-DD, today when omitted
    #[param(value_type = Option<String>)]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Calendar year, e.g. 2026
    pub year: i32,
    /// Month 1 to 12
    pub month: u32,
    /// Restrict to one class
    pub class_id: Option<i64>,
}

impl ReportQuery {
    fn range(&self) -> Result<MonthRange, AppError> {
        MonthRange::new(self.year, self.month)
            .ok_or_else(|| AppError::BadRequest("month must be between 1 and 12".to_string()))
    }
}

/// Daily dashboard
#[utoipa::path(
    get,
    path = "/api/principal/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "School totals and per-class counts for the day", body = crate::report::dashboard::Dashboard),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a principal")
    ),
    security(("session_cookie" = [])),
    tag = "Principal"
)]
pub async fn get_dashboard(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_principal()?;

    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let dashboard = dashboard::build(pool.get_ref(), date).await?;

    Ok(HttpResponse::Ok().json(dashboard))
}

/// Monthly report
#[utoipa::path(
    get,
    path = "/api/principal/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Day-by-day statuses per student", body = crate::report::monthly::MonthlyReport),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Not a principal")
    ),
    security(("session_cookie" = [])),
    tag = "Principal"
)]
pub async fn get_monthly_report(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_principal()?;

    let report = monthly::build(pool.get_ref(), query.range()?, query.class_id).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Monthly report as a spreadsheet
#[utoipa::path(
    get,
    path = "/api/principal/report/export",
    params(ReportQuery),
    responses(
        (status = 200, description = "Workbook attachment with P/A/L/- per day", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", body = Vec<u8>),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Not a principal")
    ),
    security(("session_cookie" = [])),
    tag = "Principal"
)]
pub async fn export_monthly_report(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_principal()?;

    let report = monthly::build(pool.get_ref(), query.range()?, query.class_id).await?;
    let body = export::to_xlsx(&export::grid(&report)).map_err(|e| {
        error!(error = %e, "Failed to write workbook");
        AppError::Internal("Export failed".to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type(export::CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename={}",
                export::file_name(report.year, report.month)
            ),
        ))
        .body(body))
}

/// Individual student report
#[utoipa::path(
    get,
    path = "/api/principal/student/{student_id}",
    params(
        ("student_id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "All rows, most recent first, with totals", body = crate::report::student::StudentReport),
        (status = 404, description = "Student not found"),
        (status = 403, description = "Not a principal")
    ),
    security(("session_cookie" = [])),
    tag = "Principal"
)]
pub async fn get_student_report(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    auth.require_principal()?;

    let report = student::build(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Student"))?;

    Ok(HttpResponse::Ok().json(report))
}
