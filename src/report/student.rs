use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::percentage;
use crate::model::{
    attendance::{AttendanceMark, AttendanceStatus},
    student::Student,
};
use crate::store::{attendance, students};

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    /// Present over every row, late included in the total.
    pub percentage: f64,
}

impl AttendanceSummary {
    pub fn from_marks(marks: &[AttendanceMark]) -> Self {
        let count = |status| marks.iter().filter(|m| m.status == status).count() as i64;
        let present = count(AttendanceStatus::Present);
        let total = marks.len() as i64;

        Self {
            total,
            present,
            absent: count(AttendanceStatus::Absent),
            late: count(AttendanceStatus::Late),
            percentage: percentage(present, total),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentReport {
    pub student: Student,
    /// Most recent first.
    pub records: Vec<AttendanceMark>,
    pub summary: AttendanceSummary,
}

/// `None` when the student does not exist.
pub async fn build(pool: &SqlitePool, student_id: i64) -> Result<Option<StudentReport>, sqlx::Error> {
    let Some(student) = students::find_by_id(pool, student_id).await? else {
        return Ok(None);
    };

    let records = attendance::for_student(pool, student_id).await?;
    let summary = AttendanceSummary::from_marks(&records);

    Ok(Some(StudentReport {
        student,
        records,
        summary,
    }))
}
