//! Attendance aggregation: dashboard, monthly and per-student reports, and
//! the letter-coded export grid.

pub mod dashboard;
pub mod export;
pub mod monthly;
pub mod student;

/// `numerator / denominator × 100` rounded to one decimal, 0 for an empty denominator.
pub fn percentage(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    let raw = numerator as f64 / denominator as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
