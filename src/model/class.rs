use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "6-A",
    "name_ur": "چھٹی الف",
    "teacher_id": 3
}))]
pub struct SchoolClass {
    pub id: i64,
    pub name: String,
    pub name_ur: Option<String>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ClassWithTeacher {
    pub id: i64,
    pub name: String,
    pub name_ur: Option<String>,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
}

/// Per-class student total and status counts for a single day.
#[derive(Debug, sqlx::FromRow)]
pub struct ClassDayCounts {
    pub id: i64,
    pub name: String,
    pub teacher_name: Option<String>,
    pub total_students: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}
