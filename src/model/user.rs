use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub name_en: &'a str,
    pub name_ur: Option<&'a str>,
}
