use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::model::{
    role::Role,
    user::{NewUser, User},
};

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct TeacherSummary {
    pub id: i64,
    pub username: String,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub class_id: Option<i64>,
    pub class_name: Option<String>,
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, name_en, name_ur, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, name_en, name_ur, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &SqlitePool, user: &NewUser<'_>) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password, role, name_en, name_ur)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.username)
    .bind(user.password_hash)
    .bind(user.role)
    .bind(user.name_en)
    .bind(user.name_ur)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn list_teachers(pool: &SqlitePool) -> Result<Vec<TeacherSummary>, sqlx::Error> {
    sqlx::query_as::<_, TeacherSummary>(
        r#"
        SELECT u.id, u.username, u.name_en, u.name_ur, c.id AS class_id, c.name AS class_name
        FROM users u
        LEFT JOIN classes c ON u.id = c.teacher_id
        WHERE u.role = ?
        ORDER BY u.name_en
        "#,
    )
    .bind(Role::Teacher)
    .fetch_all(pool)
    .await
}

/// Removes the user only when it is a teacher. Returns the affected row count.
pub async fn delete_teacher(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ? AND role = ?")
        .bind(id)
        .bind(Role::Teacher)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
