use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::model::student::{NewStudent, Student, StudentHistoryRow, StudentWithStatus};

pub async fn insert(pool: &SqlitePool, student: &NewStudent<'_>) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO students (name_en, name_ur, roll_no, class_id, parent_phone)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(student.name_en)
    .bind(student.name_ur)
    .bind(student.roll_no)
    .bind(student.class_id)
    .bind(student.parent_phone)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Students of one class by roll number, or every student by class then roll number.
pub async fn list(pool: &SqlitePool, class_id: Option<i64>) -> Result<Vec<Student>, sqlx::Error> {
    match class_id {
        Some(class_id) => {
            sqlx::query_as::<_, Student>(
                r#"
                SELECT id, name_en, name_ur, roll_no, class_id, parent_phone
                FROM students
                WHERE class_id = ?
                ORDER BY roll_no
                "#,
            )
            .bind(class_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Student>(
                r#"
                SELECT id, name_en, name_ur, roll_no, class_id, parent_phone
                FROM students
                ORDER BY class_id, roll_no
                "#,
            )
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, name_en, name_ur, roll_no, class_id, parent_phone FROM students WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await
}

/// Class roster with each student's status on `date`, "present" when unmarked.
pub async fn roster_for_date(
    pool: &SqlitePool,
    class_id: i64,
    date: NaiveDate,
) -> Result<Vec<StudentWithStatus>, sqlx::Error> {
    sqlx::query_as::<_, StudentWithStatus>(
        r#"
        SELECT s.id, s.name_en, s.name_ur, s.roll_no, COALESCE(a.status, 'present') AS status
        FROM students s
        LEFT JOIN attendance a ON s.id = a.student_id AND a.date = ?
        WHERE s.class_id = ?
        ORDER BY s.roll_no
        "#,
    )
    .bind(date)
    .bind(class_id)
    .fetch_all(pool)
    .await
}

/// Class roster joined with every attendance row in `[start, end]`.
/// Students without rows appear once with no date or status.
pub async fn history(
    pool: &SqlitePool,
    class_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<StudentHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentHistoryRow>(
        r#"
        SELECT s.id, s.name_en, s.name_ur, s.roll_no, a.date, a.status
        FROM students s
        LEFT JOIN attendance a ON s.id = a.student_id AND a.date BETWEEN ? AND ?
        WHERE s.class_id = ?
        ORDER BY s.roll_no, a.date
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(class_id)
    .fetch_all(pool)
    .await
}
