use crate::api::admin::{AssignTeacher, CreateClass, CreateStudent, CreateTeacher};
use crate::api::attendance::{
    AttendanceEntry, DayAttendanceResponse, HistoryResponse, MyClassResponse, SaveAttendance,
    SaveAttendanceResponse,
};
use crate::model::attendance::{AttendanceMark, AttendanceStatus};
use crate::model::class::{ClassWithTeacher, SchoolClass};
use crate::model::notification::{Notification, NotificationStatus, NotificationView};
use crate::model::role::Role;
use crate::model::student::{Student, StudentHistoryRow, StudentWithStatus};
use crate::models::{CreatedResponse, LoginReqDto, MessageResponse, UserResponse};
use crate::report::dashboard::{ClassSummary, Dashboard, DashboardStats};
use crate::report::monthly::{MonthlyReport, MonthlyStudent};
use crate::report::student::{AttendanceSummary, StudentReport};
use crate::store::users::TeacherSummary;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

/// Registers the session cookie set by `/auth/login`.
pub struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Attendance API",
        version = "1.0.0",
        description = r#"
## School Attendance Tracker

Daily attendance for a single school, with three roles:

- **Admin** manages teachers, classes and students
- **Teacher** marks present, absent or late for their own class
- **Principal** reads the daily dashboard, monthly reports and student reports

Every absence opens a pending parent notification that the principal marks as sent.

### 🔐 Security
Call `POST /auth/login` first. The response sets an http-only `session` cookie
that authenticates every `/api` route until `POST /auth/logout`.

### 📦 Response Format
JSON everywhere except the monthly export, which is an xlsx attachment.
Errors are `{"error": "..."}`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::admin::list_teachers,
        crate::api::admin::create_teacher,
        crate::api::admin::delete_teacher,
        crate::api::admin::list_students,
        crate::api::admin::create_student,
        crate::api::admin::delete_student,
        crate::api::admin::list_classes,
        crate::api::admin::create_class,
        crate::api::admin::assign_teacher,

        crate::api::attendance::my_class,
        crate::api::attendance::get_attendance,
        crate::api::attendance::save_attendance,
        crate::api::attendance::history,

        crate::api::report::get_dashboard,
        crate::api::report::get_monthly_report,
        crate::api::report::export_monthly_report,
        crate::api::report::get_student_report,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_sent
    ),
    components(
        schemas(
            LoginReqDto,
            UserResponse,
            MessageResponse,
            CreatedResponse,
            Role,
            CreateTeacher,
            CreateStudent,
            CreateClass,
            AssignTeacher,
            TeacherSummary,
            Student,
            SchoolClass,
            ClassWithTeacher,
            AttendanceStatus,
            AttendanceMark,
            AttendanceEntry,
            SaveAttendance,
            SaveAttendanceResponse,
            MyClassResponse,
            DayAttendanceResponse,
            HistoryResponse,
            StudentWithStatus,
            StudentHistoryRow,
            Dashboard,
            DashboardStats,
            ClassSummary,
            MonthlyReport,
            MonthlyStudent,
            StudentReport,
            AttendanceSummary,
            Notification,
            NotificationStatus,
            NotificationView
        )
    ),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "Auth", description = "Login, logout and the current user"),
        (name = "Admin", description = "Teachers, classes and students"),
        (name = "Teacher", description = "Marking attendance for the assigned class"),
        (name = "Principal", description = "Dashboard and reports"),
        (name = "Notifications", description = "Parent absence notifications"),
    )
)]
pub struct ApiDoc;
