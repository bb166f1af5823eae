use super::monthly::{MonthlyReport, NO_MARK};
use crate::model::attendance::AttendanceStatus;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, XlsxError};
use std::str::FromStr;

/// Header plus one row per student: roll number, name, a letter per day
/// (P/A/L/-), then present total, absent total and percentage.
pub fn grid(report: &MonthlyReport) -> Vec<Vec<String>> {
    let mut header = vec!["Roll No".to_string(), "Student Name".to_string()];
    header.extend((1..=report.days_in_month).map(|d| d.to_string()));
    header.extend(["Total P", "Total A", "%"].map(String::from));

    let mut rows = Vec::with_capacity(report.students.len() + 1);
    rows.push(header);

    for student in &report.students {
        let mut row = vec![student.roll_no.clone(), student.name_en.clone()];
        row.extend(student.days.values().map(|mark| letter(mark)));
        row.push(student.total_present.to_string());
        row.push(student.total_absent.to_string());
        row.push(format!("{:.1}%", student.percentage));
        rows.push(row);
    }

    rows
}

fn letter(mark: &str) -> String {
    AttendanceStatus::from_str(mark)
        .map(|s| s.code().to_string())
        .unwrap_or_else(|_| NO_MARK.to_string())
}

pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Attendance Report";

/// Writes the grid into a single-sheet workbook. The header is bold; the
/// present and absent totals are numeric cells, everything else is text.
pub fn to_xlsx(rows: &[Vec<String>]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(1, 24)?;

    for (r, row) in rows.iter().enumerate() {
        let r = r as RowNum;
        let totals = row.len().saturating_sub(3)..row.len().saturating_sub(1);

        for (c, cell) in row.iter().enumerate() {
            let col = c as ColNum;
            if r == 0 {
                sheet.write_string_with_format(r, col, cell, &bold)?;
            } else if let (true, Ok(n)) = (totals.contains(&c), cell.parse::<f64>()) {
                sheet.write_number(r, col, n)?;
            } else {
                sheet.write_string(r, col, cell)?;
            }
        }
    }

    workbook.save_to_buffer()
}

pub fn file_name(year: i32, month: u32) -> String {
    format!("attendance_{}_{:02}.xlsx", year, month)
}
