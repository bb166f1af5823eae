use crate::{
    api::{admin, attendance, notification, report},
    auth::{handlers, middleware::session_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use tracing::warn;

/// Per-route limiter; `None` when disabled or the quota cannot be built.
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    if requests_per_min == 0 {
        return None;
    }

    let per_ms = (60_000 / requests_per_min as u64).max(1);
    match GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
    {
        Some(cfg) => Some(Governor::new(&cfg)),
        None => {
            warn!(requests_per_min, "Invalid login rate limit, limiter disabled");
            None
        }
    }
}

/// Malformed bodies, query strings and path segments answer with the JSON error shape.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    extractor_errors(cfg);

    // Public routes
    let logout = web::resource("/logout").route(web::post().to(handlers::logout));
    match build_limiter(config.rate_login_per_min) {
        Some(limiter) => cfg.service(
            web::scope("/auth")
                .service(
                    web::resource("/login")
                        .wrap(limiter)
                        .route(web::post().to(handlers::login)),
                )
                .service(logout),
        ),
        None => cfg.service(
            web::scope("/auth")
                .service(web::resource("/login").route(web::post().to(handlers::login)))
                .service(logout),
        ),
    };

    // Session-protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(session_middleware))
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/teachers")
                            .route(web::get().to(admin::list_teachers))
                            .route(web::post().to(admin::create_teacher)),
                    )
                    .service(
                        web::resource("/teachers/{teacher_id}")
                            .route(web::delete().to(admin::delete_teacher)),
                    )
                    .service(
                        web::resource("/students")
                            .route(web::get().to(admin::list_students))
                            .route(web::post().to(admin::create_student)),
                    )
                    .service(
                        web::resource("/students/{student_id}")
                            .route(web::delete().to(admin::delete_student)),
                    )
                    .service(
                        web::resource("/classes")
                            .route(web::get().to(admin::list_classes))
                            .route(web::post().to(admin::create_class)),
                    )
                    .service(
                        web::resource("/classes/{class_id}/assign-teacher")
                            .route(web::put().to(admin::assign_teacher)),
                    ),
            )
            .service(
                web::scope("/teacher")
                    .service(web::resource("/my-class").route(web::get().to(attendance::my_class)))
                    .service(
                        web::resource("/attendance")
                            .route(web::post().to(attendance::save_attendance)),
                    )
                    .service(
                        web::resource("/attendance/{date}")
                            .route(web::get().to(attendance::get_attendance)),
                    )
                    .service(web::resource("/history").route(web::get().to(attendance::history))),
            )
            .service(
                web::scope("/principal")
                    .service(web::resource("/dashboard").route(web::get().to(report::get_dashboard)))
                    .service(
                        web::resource("/report").route(web::get().to(report::get_monthly_report)),
                    )
                    .service(
                        web::resource("/report/export")
                            .route(web::get().to(report::export_monthly_report)),
                    )
                    .service(
                        web::resource("/student/{student_id}")
                            .route(web::get().to(report::get_student_report)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("").route(web::get().to(notification::list_notifications)),
                    )
                    .service(
                        web::resource("/{notification_id}/send")
                            .route(web::post().to(notification::mark_sent)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::session::SessionStore, bootstrap, db::memory_pool,
        model::attendance::AttendanceStatus,
    };
    use actix_web::{App, http::StatusCode, http::header, test, web::Data};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn demo_school() -> SqlitePool {
        let pool = memory_pool().await;
        let config = Config {
            seed_demo_data: true,
            ..Config::for_tests()
        };
        bootstrap::run(&pool, &config).await.unwrap();
        pool
    }

    macro_rules! app {
        ($pool:expr) => {{
            let config = Config::for_tests();
            test::init_service(
                App::new()
                    .app_data(Data::new($pool.clone()))
                    .app_data(Data::new(config.clone()))
                    .app_data(Data::new(SessionStore::new(None)))
                    .configure(|cfg| configure(cfg, &config)),
            )
            .await
        }};
    }

    macro_rules! login {
        ($app:expr, $username:expr) => {{
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "username": $username, "password": "school123" }))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            resp.response()
                .cookies()
                .find(|c| c.name() == "session")
                .expect("session cookie")
                .into_owned()
        }};
    }

    #[actix_web::test]
    async fn api_requires_a_session() {
        let pool = demo_school().await;
        let app = app!(pool);

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Not authenticated");
    }

    #[actix_web::test]
    async fn login_limiter_rejects_past_the_burst() {
        assert!(build_limiter(0).is_none());

        let pool = demo_school().await;
        let config = Config {
            rate_login_per_min: 2,
            ..Config::for_tests()
        };
        let app = test::init_service(
            App::new()
                .app_data(Data::new(pool.clone()))
                .app_data(Data::new(config.clone()))
                .app_data(Data::new(SessionStore::new(None)))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let mut statuses = Vec::new();
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .peer_addr("10.0.0.7:4000".parse().unwrap())
                .set_json(json!({ "username": "principal", "password": "nope" }))
                .to_request();
            // the limiter answers through the service error path
            let status = match test::try_call_service(&app, req).await {
                Ok(resp) => resp.status(),
                Err(err) => err.error_response().status(),
            };
            statuses.push(status);
        }
        assert_eq!(
            statuses,
            [
                StatusCode::UNAUTHORIZED,
                StatusCode::UNAUTHORIZED,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[actix_web::test]
    async fn login_me_and_logout() {
        let pool = demo_school().await;
        let app = app!(pool);

        let wrong = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "principal", "password": "nope" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, wrong).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let empty = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "", "password": "" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, empty).await.status(),
            StatusCode::BAD_REQUEST
        );

        let cookie = login!(app, "principal");
        assert!(cookie.http_only().unwrap_or(false));

        let req = test::TestRequest::get()
            .uri("/api/me")
            .cookie(cookie.clone())
            .to_request();
        let me: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["username"], "principal");
        assert_eq!(me["role"], "principal");

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/me").cookie(cookie).to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn roles_are_enforced_per_route() {
        let pool = demo_school().await;
        let app = app!(pool);
        let teacher = login!(app, "teacher1");
        let admin = login!(app, "admin");

        for uri in ["/api/principal/dashboard", "/api/admin/teachers"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .cookie(teacher.clone())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        }

        let req = test::TestRequest::get()
            .uri("/api/teacher/my-class")
            .cookie(admin.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/admin/students?class_id=1")
            .cookie(admin)
            .to_request();
        let students: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(students.as_array().map(Vec::len), Some(20));
    }

    #[actix_web::test]
    async fn absence_flows_from_teacher_to_principal() {
        let pool = demo_school().await;
        let app = app!(pool);
        let teacher = login!(app, "teacher1");
        let principal = login!(app, "principal");

        let req = test::TestRequest::get()
            .uri("/api/teacher/my-class")
            .cookie(teacher.clone())
            .to_request();
        let class: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(class["class"]["name"], "6-A");
        let ids: Vec<i64> = class["students"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids.len(), 20);

        let records: Vec<Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let status = match i {
                    0 => "absent",
                    1 => "late",
                    _ => "present",
                };
                json!({ "student_id": id, "status": status })
            })
            .collect();
        let req = test::TestRequest::post()
            .uri("/api/teacher/attendance")
            .cookie(teacher.clone())
            .set_json(json!({ "date": "2026-01-05", "records": records }))
            .to_request();
        let saved: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved["saved"], 20);
        assert_eq!(saved["notifications_created"], 1);

        // a student from another class is rejected as a whole
        let req = test::TestRequest::post()
            .uri("/api/teacher/attendance")
            .cookie(teacher.clone())
            .set_json(json!({
                "date": "2026-01-05",
                "records": [{ "student_id": 160, "status": "absent" }]
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/principal/dashboard?date=2026-01-05")
            .cookie(principal.clone())
            .to_request();
        let dashboard: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dashboard["stats"]["total_students"], 160);
        assert_eq!(dashboard["stats"]["present_count"], 18);
        assert_eq!(dashboard["stats"]["absent_count"], 1);
        assert_eq!(dashboard["stats"]["late_count"], 1);
        let submitted = dashboard["classes"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["attendance_submitted"] == true)
            .count();
        assert_eq!(submitted, 1);

        let req = test::TestRequest::get()
            .uri("/api/notifications?status=pending")
            .cookie(principal.clone())
            .to_request();
        let pending: Value = test::call_and_read_body_json(&app, req).await;
        let pending = pending.as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["class_name"], "6-A");
        let notification_id = pending[0]["id"].as_i64().unwrap();

        // only the principal sends
        let req = test::TestRequest::post()
            .uri(&format!("/api/notifications/{notification_id}/send"))
            .cookie(teacher)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/api/notifications/{notification_id}/send"))
            .cookie(principal.clone())
            .to_request();
        let sent: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sent["status"], "sent");

        let req = test::TestRequest::get()
            .uri(&format!("/api/principal/student/{}", ids[0]))
            .cookie(principal)
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["summary"]["absent"], 1);
        assert_eq!(report["summary"]["total"], 1);
    }

    #[actix_web::test]
    async fn reports_validate_the_month_and_export_a_workbook() {
        let pool = demo_school().await;
        let app = app!(pool);
        let principal = login!(app, "principal");

        let req = test::TestRequest::get()
            .uri("/api/principal/report?year=2026&month=13")
            .cookie(principal.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/principal/report?year=2026&month=feb")
            .cookie(principal.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());

        let req = test::TestRequest::get()
            .uri("/api/principal/report?year=2026&month=2&class_id=1")
            .cookie(principal.clone())
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["days_in_month"], 28);
        assert_eq!(report["students"].as_array().map(Vec::len), Some(20));

        let req = test::TestRequest::get()
            .uri("/api/principal/report/export?year=2026&month=2&class_id=1")
            .cookie(principal)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(
            content_type.to_str().unwrap(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("attendance_2026_02.xlsx"));
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"PK"));
    }

    #[actix_web::test]
    async fn malformed_dates_are_bad_requests() {
        let pool = demo_school().await;
        let app = app!(pool);
        let teacher = login!(app, "teacher1");

        let req = test::TestRequest::get()
            .uri("/api/teacher/attendance/2026-13-40")
            .cookie(teacher)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn admin_writes_map_constraint_failures_to_statuses() {
        let pool = demo_school().await;
        let app = app!(pool);
        let admin = login!(app, "admin");

        macro_rules! send {
            ($req:expr) => {
                test::call_service(&app, $req.cookie(admin.clone()).to_request())
                    .await
                    .status()
            };
        }

        // teachers
        let teacher = |username: &str, class_id: i64| {
            json!({
                "username": username,
                "password": "school123",
                "name_en": "Teacher 6",
                "class_id": class_id
            })
        };
        assert_eq!(
            send!(test::TestRequest::post().uri("/api/admin/teachers").set_json(teacher(" ", 6))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            send!(test::TestRequest::post().uri("/api/admin/teachers").set_json(teacher("teacher6", 999))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send!(test::TestRequest::post().uri("/api/admin/teachers").set_json(teacher("teacher6", 6))),
            StatusCode::CREATED
        );
        assert_eq!(
            send!(test::TestRequest::post().uri("/api/admin/teachers").set_json(teacher("teacher6", 7))),
            StatusCode::CONFLICT
        );

        let new_teacher = login!(app, "teacher6");
        let req = test::TestRequest::get()
            .uri("/api/teacher/my-class")
            .cookie(new_teacher)
            .to_request();
        let class: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(class["class"]["name"], "8-B");

        // assignment only accepts teachers and known classes
        let assign = |teacher_id: Option<i64>| json!({ "teacher_id": teacher_id });
        assert_eq!(
            send!(test::TestRequest::put().uri("/api/admin/classes/7/assign-teacher").set_json(assign(Some(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send!(test::TestRequest::put().uri("/api/admin/classes/999/assign-teacher").set_json(assign(Some(3)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send!(test::TestRequest::put().uri("/api/admin/classes/1/assign-teacher").set_json(assign(None))),
            StatusCode::OK
        );
        assert_eq!(
            send!(test::TestRequest::delete().uri("/api/admin/teachers/1")),
            StatusCode::NOT_FOUND
        );

        // students
        let student = |roll_no: &str, class_id: i64| {
            json!({ "name_en": "New Student", "roll_no": roll_no, "class_id": class_id })
        };
        assert_eq!(
            send!(test::TestRequest::post().uri("/api/admin/students").set_json(student("01", 1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            send!(test::TestRequest::post().uri("/api/admin/students").set_json(student("01", 999))),
            StatusCode::NOT_FOUND
        );
        let req = test::TestRequest::post()
            .uri("/api/admin/students")
            .set_json(student("21", 1))
            .cookie(admin.clone())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let new_id = created["id"].as_i64().unwrap();

        let day = chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        crate::store::attendance::upsert(&pool, 1, 1, day, AttendanceStatus::Absent, 3)
            .await
            .unwrap();
        assert_eq!(
            send!(test::TestRequest::delete().uri("/api/admin/students/1")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            send!(test::TestRequest::delete().uri(&format!("/api/admin/students/{new_id}"))),
            StatusCode::OK
        );
        assert_eq!(
            send!(test::TestRequest::delete().uri(&format!("/api/admin/students/{new_id}"))),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn teacher_views_default_to_present_and_clamp_history() {
        let pool = demo_school().await;
        let app = app!(pool);
        let teacher = login!(app, "teacher1");

        let today = chrono::Local::now().date_naive();
        let long_ago = today - chrono::Days::new(400);
        crate::store::attendance::upsert(&pool, 1, 1, today, AttendanceStatus::Absent, 3)
            .await
            .unwrap();
        crate::store::attendance::upsert(&pool, 2, 1, long_ago, AttendanceStatus::Late, 3)
            .await
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/api/teacher/my-class")
            .cookie(teacher.clone())
            .to_request();
        let class: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(class["students"][0]["status"], "absent");
        assert_eq!(class["students"][1]["status"], "present");

        // 1000 days is clamped to 365, so the 400-day-old row stays out
        let req = test::TestRequest::get()
            .uri("/api/teacher/history?days=1000")
            .cookie(teacher.clone())
            .to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        let records = history["records"].as_array().unwrap();
        assert_eq!(records.len(), 20);
        assert_eq!(records[0]["date"], today.to_string());
        assert_eq!(records[0]["status"], "absent");
        assert!(records[1]["date"].is_null());
        assert_eq!(
            history["date_range"],
            format!("{} to {}", today - chrono::Days::new(365), today)
        );

        let req = test::TestRequest::get()
            .uri("/api/teacher/history?days=0")
            .cookie(teacher)
            .to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            history["date_range"],
            format!("{} to {}", today - chrono::Days::new(1), today)
        );
    }
}
