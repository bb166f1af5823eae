use anyhow::{Context, anyhow};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    auth::password::hash_password,
    config::Config,
    model::{role::Role, student::NewStudent, user::NewUser},
    store::{classes, students, users},
};

const DEMO_PASSWORD: &str = "school123";
const DEMO_TEACHERS: usize = 5;
const DEMO_STUDENTS_PER_CLASS: u32 = 20;
const DEMO_CLASSES: [(&str, &str); 8] = [
    ("6-A", "چھٹی الف"),
    ("6-B", "چھٹی ب"),
    ("7-A", "ساتویں الف"),
    ("7-B", "ساتویں ب"),
    ("8-A", "آٹھویں الف"),
    ("8-B", "آٹھویں ب"),
    ("9-A", "نویں الف"),
    ("10-A", "دسویں الف"),
];

/// First-start provisioning. Does nothing once any user exists.
pub async fn run(pool: &SqlitePool, config: &Config) -> anyhow::Result<()> {
    if users::count(pool).await? > 0 {
        return Ok(());
    }

    if config.seed_demo_data {
        return seed_demo(pool).await;
    }

    match (&config.admin_username, &config.admin_password) {
        (Some(username), Some(password)) => create_admin(pool, username, password).await,
        _ => {
            warn!("No users exist; set ADMIN_USERNAME and ADMIN_PASSWORD to create an admin");
            Ok(())
        }
    }
}

fn hash(password: &str) -> anyhow::Result<String> {
    hash_password(password).map_err(|e| anyhow!("hashing password: {e}"))
}

async fn create_admin(pool: &SqlitePool, username: &str, password: &str) -> anyhow::Result<()> {
    let hashed = hash(password)?;
    let id = users::insert(
        pool,
        &NewUser {
            username,
            password_hash: &hashed,
            role: Role::Admin,
            name_en: "Admin User",
            name_ur: Some("منتظم"),
        },
    )
    .await
    .context("creating bootstrap admin")?;

    info!(user_id = id, username, "Bootstrap admin created");
    Ok(())
}

/// Admin, principal, five teachers and eight classes of twenty students.
/// Every account uses the demo password.
async fn seed_demo(pool: &SqlitePool) -> anyhow::Result<()> {
    let hashed = hash(DEMO_PASSWORD)?;
    for (username, role, name_en, name_ur) in [
        ("admin", Role::Admin, "Admin User", "منتظم"),
        ("principal", Role::Principal, "Principal", "پرنسپل"),
    ] {
        users::insert(
            pool,
            &NewUser {
                username,
                password_hash: &hashed,
                role,
                name_en,
                name_ur: Some(name_ur),
            },
        )
        .await
        .context("seeding staff")?;
    }

    let mut teacher_ids = Vec::with_capacity(DEMO_TEACHERS);
    for i in 1..=DEMO_TEACHERS {
        let username = format!("teacher{i}");
        let name_en = format!("Teacher {i}");
        let name_ur = format!("استاد {i}");
        let id = users::insert(
            pool,
            &NewUser {
                username: &username,
                password_hash: &hashed,
                role: Role::Teacher,
                name_en: &name_en,
                name_ur: Some(name_ur.as_str()),
            },
        )
        .await
        .context("seeding teachers")?;
        teacher_ids.push(id);
    }

    let mut phone_seq = 0u32;
    for (i, &(name, name_ur)) in DEMO_CLASSES.iter().enumerate() {
        let class_id = classes::insert(pool, name, Some(name_ur), teacher_ids.get(i).copied())
            .await
            .context("seeding classes")?;

        for roll in 1..=DEMO_STUDENTS_PER_CLASS {
            let roll_no = format!("{roll:02}");
            let name_en = format!("Student {name}-{roll_no}");
            let name_ur = format!("طالب علم {name}-{roll_no}");
            let phone = format!("0300-{:07}", 1_000_000 + phone_seq);
            phone_seq += 1;

            students::insert(
                pool,
                &NewStudent {
                    name_en: &name_en,
                    name_ur: Some(name_ur.as_str()),
                    roll_no: &roll_no,
                    class_id,
                    parent_phone: Some(phone.as_str()),
                },
            )
            .await
            .context("seeding students")?;
        }
    }

    info!(
        teachers = DEMO_TEACHERS,
        classes = DEMO_CLASSES.len(),
        students = phone_seq,
        "Demo data seeded"
    );
    Ok(())
}
