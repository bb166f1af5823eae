use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{AppError, is_foreign_key_violation, is_unique_violation},
    model::{role::Role, student::NewStudent, user::NewUser},
    models::{CreatedResponse, MessageResponse},
    store::{classes, students, users},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTeacher {
    #[schema(example = "teacher6")]
    pub username: String,
    #[schema(example = "school123")]
    pub password: String,
    #[schema(example = "Teacher 6")]
    pub name_en: String,
    #[schema(example = "استاد 6")]
    pub name_ur: Option<String>,
    /// Class to hand to the new teacher
    #[schema(example = 6)]
    pub class_id: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateStudent {
    #[schema(example = "Ali Khan")]
    pub name_en: String,
    #[schema(example = "علی خان")]
    pub name_ur: Option<String>,
    #[schema(example = "21")]
    pub roll_no: String,
    #[schema(example = 1)]
    pub class_id: i64,
    #[schema(example = "0300-1000160")]
    pub parent_phone: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateClass {
    #[schema(example = "10-B")]
    pub name: String,
    #[schema(example = "دسویں ب")]
    pub name_ur: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignTeacher {
    /// Null clears the assignment
    #[schema(example = 3)]
    pub teacher_id: Option<i64>,
}

#[derive(Deserialize, IntoParams)]
pub struct StudentFilter {
    /// Only students of this class
    pub class_id: Option<i64>,
}

fn required(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

/// List teachers
#[utoipa::path(
    get,
    path = "/api/admin/teachers",
    responses(
        (status = 200, description = "Teachers with their class", body = [crate::store::users::TeacherSummary]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_teachers(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let teachers = users::list_teachers(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(teachers))
}

/// Create teacher
#[utoipa::path(
    post,
    path = "/api/admin/teachers",
    request_body = CreateTeacher,
    responses(
        (status = 201, description = "Teacher created", body = CreatedResponse),
        (status = 400, description = "Missing field"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Username already exists")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_teacher(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateTeacher>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let username = payload.username.trim();
    required(username, "username")?;
    required(&payload.password, "password")?;
    required(&payload.name_en, "name_en")?;

    if let Some(class_id) = payload.class_id {
        classes::find_by_id(pool.get_ref(), class_id)
            .await?
            .ok_or_else(|| AppError::not_found("Class"))?;
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal("Password hashing failed".to_string())
    })?;

    let user_id = users::insert(
        pool.get_ref(),
        &NewUser {
            username,
            password_hash: &hashed,
            role: Role::Teacher,
            name_en: payload.name_en.trim(),
            name_ur: payload.name_ur.as_deref(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Username already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    if let Some(class_id) = payload.class_id {
        classes::assign_teacher(pool.get_ref(), class_id, Some(user_id)).await?;
    }

    info!(user_id, username, "Teacher created");
    Ok(HttpResponse::Created().json(CreatedResponse::new(user_id, "Teacher created")))
}

/// Delete teacher
#[utoipa::path(
    delete,
    path = "/api/admin/teachers/{teacher_id}",
    params(
        ("teacher_id" = i64, Path, description = "Teacher user ID")
    ),
    responses(
        (status = 200, description = "Teacher deleted, their class is left unassigned", body = MessageResponse),
        (status = 404, description = "Teacher not found")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn delete_teacher(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let teacher_id = path.into_inner();

    if users::delete_teacher(pool.get_ref(), teacher_id).await? == 0 {
        return Err(AppError::not_found("Teacher"));
    }

    info!(teacher_id, "Teacher deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Teacher deleted")))
}

/// List students
#[utoipa::path(
    get,
    path = "/api/admin/students",
    params(StudentFilter),
    responses(
        (status = 200, description = "Students ordered by roll number", body = [crate::model::student::Student]),
        (status = 403, description = "Not an admin or principal")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_students(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<StudentFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_role(&[Role::Admin, Role::Principal])?;

    let students = students::list(pool.get_ref(), query.class_id).await?;
    Ok(HttpResponse::Ok().json(students))
}

/// Create student
#[utoipa::path(
    post,
    path = "/api/admin/students",
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = CreatedResponse),
        (status = 400, description = "Missing field"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Roll number already used in the class")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_student(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateStudent>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    required(&payload.name_en, "name_en")?;
    required(&payload.roll_no, "roll_no")?;

    let student_id = students::insert(
        pool.get_ref(),
        &NewStudent {
            name_en: payload.name_en.trim(),
            name_ur: payload.name_ur.as_deref(),
            roll_no: payload.roll_no.trim(),
            class_id: payload.class_id,
            parent_phone: payload.parent_phone.as_deref(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Roll number already exists in this class".to_string())
        } else if is_foreign_key_violation(&e) {
            AppError::not_found("Class")
        } else {
            AppError::from(e)
        }
    })?;

    info!(student_id, class_id = payload.class_id, "Student created");
    Ok(HttpResponse::Created().json(CreatedResponse::new(student_id, "Student created")))
}

/// Delete student
#[utoipa::path(
    delete,
    path = "/api/admin/students/{student_id}",
    params(
        ("student_id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student has attendance or notifications")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn delete_student(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let student_id = path.into_inner();

    let affected = students::delete(pool.get_ref(), student_id)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Conflict("Student has attendance records".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    if affected == 0 {
        return Err(AppError::not_found("Student"));
    }

    info!(student_id, "Student deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Student deleted")))
}

/// List classes
#[utoipa::path(
    get,
    path = "/api/admin/classes",
    responses(
        (status = 200, description = "Classes with teacher name", body = [crate::model::class::ClassWithTeacher]),
        (status = 403, description = "Not an admin or principal")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_classes(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    auth.require_role(&[Role::Admin, Role::Principal])?;

    let classes = classes::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(classes))
}

/// Create class
#[utoipa::path(
    post,
    path = "/api/admin/classes",
    request_body = CreateClass,
    responses(
        (status = 201, description = "Class created", body = CreatedResponse),
        (status = 400, description = "Missing name")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_class(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateClass>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    required(&payload.name, "name")?;

    let class_id = classes::insert(
        pool.get_ref(),
        payload.name.trim(),
        payload.name_ur.as_deref(),
        None,
    )
    .await?;

    info!(class_id, "Class created");
    Ok(HttpResponse::Created().json(CreatedResponse::new(class_id, "Class created")))
}

/// Assign or clear a class teacher
#[utoipa::path(
    put,
    path = "/api/admin/classes/{class_id}/assign-teacher",
    params(
        ("class_id" = i64, Path, description = "Class ID")
    ),
    request_body = AssignTeacher,
    responses(
        (status = 200, description = "Teacher assigned", body = MessageResponse),
        (status = 404, description = "Class or teacher not found")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn assign_teacher(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<AssignTeacher>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let class_id = path.into_inner();

    // a teacher already owning another class is accepted as is
    if let Some(teacher_id) = payload.teacher_id {
        match users::find_by_id(pool.get_ref(), teacher_id).await? {
            Some(user) if user.role == Role::Teacher => {}
            _ => return Err(AppError::not_found("Teacher")),
        }
    }

    if classes::assign_teacher(pool.get_ref(), class_id, payload.teacher_id).await? == 0 {
        return Err(AppError::not_found("Class"));
    }

    info!(class_id, teacher_id = ?payload.teacher_id, "Class teacher updated");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Teacher assigned")))
}
