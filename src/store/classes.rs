use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::model::class::{ClassDayCounts, ClassWithTeacher, SchoolClass};

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    name_ur: Option<&str>,
    teacher_id: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO classes (name, name_ur, teacher_id) VALUES (?, ?, ?)")
        .bind(name)
        .bind(name_ur)
        .bind(teacher_id)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<ClassWithTeacher>, sqlx::Error> {
    sqlx::query_as::<_, ClassWithTeacher>(
        r#"
        SELECT c.id, c.name, c.name_ur, c.teacher_id, u.name_en AS teacher_name
        FROM classes c
        LEFT JOIN users u ON c.teacher_id = u.id
        ORDER BY c.name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<SchoolClass>, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>("SELECT id, name, name_ur, teacher_id FROM classes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// The class owned by a teacher. When several classes name the same teacher
/// the lowest id wins.
pub async fn find_by_teacher(
    pool: &SqlitePool,
    teacher_id: i64,
) -> Result<Option<SchoolClass>, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>(
        "SELECT id, name, name_ur, teacher_id FROM classes WHERE teacher_id = ? ORDER BY id LIMIT 1",
    )
    .bind(teacher_id)
    .fetch_optional(pool)
    .await
}

/// Sets or clears the owning teacher. Returns the affected row count.
pub async fn assign_teacher(
    pool: &SqlitePool,
    class_id: i64,
    teacher_id: Option<i64>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE classes SET teacher_id = ? WHERE id = ?")
        .bind(teacher_id)
        .bind(class_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn day_counts(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<ClassDayCounts>, sqlx::Error> {
    sqlx::query_as::<_, ClassDayCounts>(
        r#"
        SELECT c.id, c.name, u.name_en AS teacher_name,
               (SELECT COUNT(*) FROM students WHERE class_id = c.id) AS total_students,
               (SELECT COUNT(*) FROM attendance WHERE class_id = c.id AND date = ?1 AND status = 'present') AS present,
               (SELECT COUNT(*) FROM attendance WHERE class_id = c.id AND date = ?1 AND status = 'absent') AS absent,
               (SELECT COUNT(*) FROM attendance WHERE class_id = c.id AND date = ?1 AND status = 'late') AS late
        FROM classes c
        LEFT JOIN users u ON c.teacher_id = u.id
        ORDER BY c.name
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::model::role::Role;
    use crate::store::users::tests::insert_user;

    #[actix_web::test]
    async fn assign_and_clear_teacher() {
        let pool = memory_pool().await;
        let teacher = insert_user(&pool, "teacher1", Role::Teacher).await;
        let class_id = insert(&pool, "7-B", Some("ساتویں ب"), None).await.unwrap();

        assert!(find_by_teacher(&pool, teacher).await.unwrap().is_none());

        assert_eq!(assign_teacher(&pool, class_id, Some(teacher)).await.unwrap(), 1);
        let owned = find_by_teacher(&pool, teacher).await.unwrap().unwrap();
        assert_eq!(owned.id, class_id);

        assert_eq!(assign_teacher(&pool, class_id, None).await.unwrap(), 1);
        assert!(find_by_teacher(&pool, teacher).await.unwrap().is_none());

        assert_eq!(assign_teacher(&pool, 999, Some(teacher)).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn deleting_teacher_unassigns_class() {
        let pool = memory_pool().await;
        let teacher = insert_user(&pool, "teacher1", Role::Teacher).await;
        let class_id = insert(&pool, "6-A", None, Some(teacher)).await.unwrap();

        crate::store::users::delete_teacher(&pool, teacher).await.unwrap();

        let class = find_by_id(&pool, class_id).await.unwrap().unwrap();
        assert!(class.teacher_id.is_none());
    }

    #[actix_web::test]
    async fn list_orders_by_name_with_teacher_name() {
        let pool = memory_pool().await;
        let teacher = insert_user(&pool, "teacher1", Role::Teacher).await;
        insert(&pool, "8-A", None, None).await.unwrap();
        insert(&pool, "6-A", None, Some(teacher)).await.unwrap();

        let classes = list(&pool).await.unwrap();
        assert_eq!(classes[0].name, "6-A");
        assert_eq!(classes[0].teacher_name.as_deref(), Some("teacher1"));
        assert_eq!(classes[1].name, "8-A");
        assert!(classes[1].teacher_name.is_none());
    }
}
