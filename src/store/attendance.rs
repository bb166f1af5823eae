use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::model::{
    attendance::{AttendanceMark, AttendanceRecord, AttendanceStatus},
    student::Student,
};
use crate::store::notifications;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StatusCounts {
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub saved: usize,
    pub notifications_created: usize,
}

/// Inserts the row for (student, date) or overwrites its status and marker.
/// Returns the stored row.
pub async fn upsert(
    pool: &SqlitePool,
    student_id: i64,
    class_id: i64,
    date: NaiveDate,
    status: AttendanceStatus,
    marked_by: i64,
) -> Result<AttendanceRecord, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        INSERT INTO attendance (student_id, class_id, date, status, marked_by)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(student_id, date)
        DO UPDATE SET status = excluded.status, marked_by = excluded.marked_by
        RETURNING id, student_id, class_id, date, status, marked_by
        "#,
    )
    .bind(student_id)
    .bind(class_id)
    .bind(date)
    .bind(status)
    .bind(marked_by)
    .fetch_one(pool)
    .await
}

/// Records one day of attendance for a class.
///
/// Each entry is upserted on its own statement; an absent mark also adds a
/// pending notification when none exists for that student and day. There is
/// no transaction: a failure part way leaves the earlier entries saved.
/// Notifications are never retracted when a student is later re-marked.
pub async fn save_for_class(
    pool: &SqlitePool,
    class_id: i64,
    marked_by: i64,
    date: NaiveDate,
    entries: &[(&Student, AttendanceStatus)],
) -> Result<SaveOutcome, sqlx::Error> {
    let mut outcome = SaveOutcome::default();

    for (student, status) in entries {
        let record = upsert(pool, student.id, class_id, date, *status, marked_by).await?;
        outcome.saved += 1;

        if record.status == AttendanceStatus::Absent {
            let message = absence_message(student, date);
            if notifications::insert_pending(pool, student.id, class_id, date, &message).await? {
                outcome.notifications_created += 1;
            }
        }
    }

    debug!(class_id, %date, saved = outcome.saved, notified = outcome.notifications_created, "Attendance saved");
    Ok(outcome)
}

fn absence_message(student: &Student, date: NaiveDate) -> String {
    format!(
        "{} (roll {}) was marked absent on {}",
        student.name_en, student.roll_no, date
    )
}

/// School-wide status counts for one day.
pub async fn day_counts(pool: &SqlitePool, date: NaiveDate) -> Result<StatusCounts, sqlx::Error> {
    sqlx::query_as::<_, StatusCounts>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'present' THEN 1 ELSE 0 END), 0) AS present,
            COALESCE(SUM(CASE WHEN status = 'absent' THEN 1 ELSE 0 END), 0) AS absent,
            COALESCE(SUM(CASE WHEN status = 'late' THEN 1 ELSE 0 END), 0) AS late
        FROM attendance
        WHERE date = ?
        "#,
    )
    .bind(date)
    .fetch_one(pool)
    .await
}

pub async fn in_range(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AttendanceMark>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceMark>(
        r#"
        SELECT student_id, date, status
        FROM attendance
        WHERE date BETWEEN ? AND ?
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

/// Every row for a student, most recent first.
pub async fn for_student(pool: &SqlitePool, student_id: i64) -> Result<Vec<AttendanceMark>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceMark>(
        r#"
        SELECT student_id, date, status
        FROM attendance
        WHERE student_id = ?
        ORDER BY date DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}
