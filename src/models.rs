use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::{role::Role, user::User};

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "teacher1")]
    pub username: String,
    #[schema(example = "school123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "username": "teacher1",
    "name_en": "Teacher 1",
    "name_ur": "استاد 1",
    "role": "teacher"
}))]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name_en: user.name_en.clone(),
            name_ur: user.name_ur.clone(),
            role: user.role,
        }
    }
}

impl From<&AuthUser> for UserResponse {
    fn from(auth: &AuthUser) -> Self {
        Self {
            id: auth.user_id,
            username: auth.username.clone(),
            name_en: auth.name_en.clone(),
            name_ur: auth.name_ur.clone(),
            role: auth.role,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Attendance saved")]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = 7)]
    pub id: i64,
    #[schema(example = "Student created")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl CreatedResponse {
    pub fn new(id: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}
