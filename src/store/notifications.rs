use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::model::notification::{Notification, NotificationStatus, NotificationView};

/// Adds a pending notification for (student, date) unless one already exists.
/// Returns true when a row was created.
pub async fn insert_pending(
    pool: &SqlitePool,
    student_id: i64,
    class_id: i64,
    date: NaiveDate,
    message: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (student_id, class_id, date, message, status)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(student_id, date) DO NOTHING
        "#,
    )
    .bind(student_id)
    .bind(class_id)
    .bind(date)
    .bind(message)
    .bind(NotificationStatus::Pending)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<NotificationStatus>,
) -> Result<Vec<NotificationView>, sqlx::Error> {
    sqlx::query_as::<_, NotificationView>(
        r#"
        SELECT n.id, n.student_id, s.name_en AS student_name, n.class_id, c.name AS class_name,
               n.date, n.status, n.message, n.created_at
        FROM notifications n
        JOIN students s ON n.student_id = s.id
        JOIN classes c ON n.class_id = c.id
        WHERE ?1 IS NULL OR n.status = ?1
        ORDER BY n.created_at DESC, n.id DESC
        "#,
    )
    .bind(status)
    .fetch_all(pool)
    .await
}

/// Moves a notification to sent; sent stays sent. `None` when the id is unknown.
pub async fn mark_sent(pool: &SqlitePool, id: i64) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications SET status = ?
        WHERE id = ?
        RETURNING id, student_id, class_id, date, message, status
        "#,
    )
    .bind(NotificationStatus::Sent)
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::store::students::tests::insert_student;

    pub(crate) async fn for_student_on(
        pool: &SqlitePool,
        student_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, student_id, class_id, date, message, status
            FROM notifications
            WHERE student_id = ? AND date = ?
            "#,
        )
        .bind(student_id)
        .bind(date)
        .fetch_all(pool)
        .await
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[actix_web::test]
    async fn pending_is_created_once_per_student_and_day() {
        let pool = memory_pool().await;
        let class_id = crate::store::classes::insert(&pool, "6-A", None, None).await.unwrap();
        let student = insert_student(&pool, class_id, "01").await;

        assert!(insert_pending(&pool, student, class_id, day(2), "absent").await.unwrap());
        assert!(!insert_pending(&pool, student, class_id, day(2), "again").await.unwrap());
        assert!(insert_pending(&pool, student, class_id, day(3), "absent").await.unwrap());

        let on_day = for_student_on(&pool, student, day(2)).await.unwrap();
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].message.as_deref(), Some("absent"));
        assert_eq!(on_day[0].status, NotificationStatus::Pending);
    }

    #[actix_web::test]
    async fn list_filters_by_status_and_mark_sent_is_one_way() {
        let pool = memory_pool().await;
        let class_id = crate::store::classes::insert(&pool, "6-A", None, None).await.unwrap();
        let s1 = insert_student(&pool, class_id, "01").await;
        let s2 = insert_student(&pool, class_id, "02").await;
        insert_pending(&pool, s1, class_id, day(2), "a").await.unwrap();
        insert_pending(&pool, s2, class_id, day(2), "b").await.unwrap();

        let all = list(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].class_name, "6-A");

        let target = all.iter().find(|n| n.student_id == s1).unwrap().id;
        let sent = mark_sent(&pool, target).await.unwrap().unwrap();
        assert_eq!(sent.status, NotificationStatus::Sent);
        let again = mark_sent(&pool, target).await.unwrap().unwrap();
        assert_eq!(again.status, NotificationStatus::Sent);
        assert!(mark_sent(&pool, 9999).await.unwrap().is_none());

        let pending = list(&pool, Some(NotificationStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].student_id, s2);

        let sent = list(&pool, Some(NotificationStatus::Sent)).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, target);
    }
}
