use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use super::percentage;
use crate::model::{attendance::AttendanceStatus, student::Student};
use crate::store::{attendance, students};

/// Filler for days without an attendance row.
pub const NO_MARK: &str = "-";

/// The calendar days of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub year: i32,
    pub month: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    /// `None` for a month outside 1..=12 or a year chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        Some(Self {
            year,
            month,
            start,
            end: next.pred_opt()?,
        })
    }

    pub fn days(&self) -> u32 {
        self.end.day()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyStudent {
    pub student_id: i64,
    pub name_en: String,
    pub name_ur: Option<String>,
    pub roll_no: String,
    /// Day of month → status, or "-" when unmarked. One entry per day.
    #[schema(example = json!({"1": "present", "2": "absent", "3": "-"}))]
    pub days: BTreeMap<u32, String>,
    pub total_present: i64,
    pub total_absent: i64,
    pub total_late: i64,
    /// Present over present + absent; late days are left out.
    #[schema(example = 95.0)]
    pub percentage: f64,
}

impl MonthlyStudent {
    pub fn summarize(student: &Student, marks: &HashMap<u32, AttendanceStatus>, days: u32) -> Self {
        let count = |status| marks.values().filter(|s| **s == status).count() as i64;
        let total_present = count(AttendanceStatus::Present);
        let total_absent = count(AttendanceStatus::Absent);
        let total_late = count(AttendanceStatus::Late);

        let days = (1..=days)
            .map(|d| {
                let mark = marks
                    .get(&d)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| NO_MARK.to_string());
                (d, mark)
            })
            .collect();

        Self {
            student_id: student.id,
            name_en: student.name_en.clone(),
            name_ur: student.name_ur.clone(),
            roll_no: student.roll_no.clone(),
            days,
            total_present,
            total_absent,
            total_late,
            percentage: percentage(total_present, total_present + total_absent),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub class_id: Option<i64>,
    pub days_in_month: u32,
    pub students: Vec<MonthlyStudent>,
}

pub async fn build(
    pool: &SqlitePool,
    range: MonthRange,
    class_id: Option<i64>,
) -> Result<MonthlyReport, sqlx::Error> {
    let roster = students::list(pool, class_id).await?;
    let rows = attendance::in_range(pool, range.start, range.end).await?;

    let mut by_student: HashMap<i64, HashMap<u32, AttendanceStatus>> = HashMap::new();
    for row in rows {
        by_student
            .entry(row.student_id)
            .or_default()
            .insert(row.date.day(), row.status);
    }

    let empty = HashMap::new();
    let students = roster
        .iter()
        .map(|s| {
            let marks = by_student.get(&s.id).unwrap_or(&empty);
            MonthlyStudent::summarize(s, marks, range.days())
        })
        .collect();

    Ok(MonthlyReport {
        year: range.year,
        month: range.month,
        class_id,
        days_in_month: range.days(),
        students,
    })
}
