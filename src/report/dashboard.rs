use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::percentage;
use crate::model::class::ClassDayCounts;
use crate::store::{attendance, attendance::StatusCounts, classes, students};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_students: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    #[schema(example = 66.7)]
    pub percentage: f64,
}

impl DashboardStats {
    /// Percentage is present over every enrolled student, marked or not.
    pub fn new(total_students: i64, counts: StatusCounts) -> Self {
        Self {
            total_students,
            present_count: counts.present,
            absent_count: counts.absent,
            late_count: counts.late,
            percentage: percentage(counts.present, total_students),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassSummary {
    pub class_id: i64,
    pub class_name: String,
    pub teacher_name: Option<String>,
    pub total_students: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    /// Heuristic: the class has students and at least one row for the day.
    pub attendance_submitted: bool,
}

impl From<ClassDayCounts> for ClassSummary {
    fn from(row: ClassDayCounts) -> Self {
        let marked = row.present + row.absent + row.late;
        Self {
            class_id: row.id,
            class_name: row.name,
            teacher_name: row.teacher_name,
            total_students: row.total_students,
            present_count: row.present,
            absent_count: row.absent,
            late_count: row.late,
            attendance_submitted: row.total_students > 0 && marked > 0,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub stats: DashboardStats,
    pub classes: Vec<ClassSummary>,
}

pub async fn build(pool: &SqlitePool, date: NaiveDate) -> Result<Dashboard, sqlx::Error> {
    let total_students = students::count(pool).await?;
    let counts = attendance::day_counts(pool, date).await?;
    let classes = classes::day_counts(pool, date)
        .await?
        .into_iter()
        .map(ClassSummary::from)
        .collect();

    Ok(Dashboard {
        date,
        stats: DashboardStats::new(total_students, counts),
        classes,
    })
}
