//! Excel 成绩表解析
//!
//! 工作表布局：
//! - 第 0 行科目，第 1 行章节，第 2 行日期，第 3 行满分，第 4 行表头
//! - 从第 5 行起每行一个学生：第 0 列学号（即学生 ID），第 1 列姓名，第 2 列学校
//!
//! 先按科目、章节、日期、满分定位测验所在的列，再逐行读取该列的成绩，
//! 直到遇到学号为空的行。

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDate, TimeDelta};

use crate::errors::{MarkSystemError, Result};

const SUBJECT_ROW: usize = 0;
const CHAPTER_ROW: usize = 1;
const DATE_ROW: usize = 2;
const TOTAL_ROW: usize = 3;

/// 9999-12-31 对应的序列号，Excel 能表示的最后一天
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// 与具体表格库无关的单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Text(String),
    Number(f64),
    /// Excel 日期序列号
    Date(f64),
}

impl From<&Data> for SheetCell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => SheetCell::Empty,
            Data::Int(i) => SheetCell::Number(*i as f64),
            Data::Float(f) => SheetCell::Number(*f),
            Data::DateTime(dt) => SheetCell::Date(dt.as_f64()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.trim().is_empty() {
                    SheetCell::Empty
                } else {
                    SheetCell::Text(s.clone())
                }
            }
            Data::Bool(b) => SheetCell::Text(b.to_string()),
        }
    }
}

impl SheetCell {
    fn text(&self) -> Option<String> {
        match self {
            SheetCell::Empty => None,
            SheetCell::Text(s) => Some(s.trim().to_string()),
            SheetCell::Number(n) | SheetCell::Date(n) => Some(format_number(*n)),
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            SheetCell::Number(n) => Some(*n),
            SheetCell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        match self {
            SheetCell::Number(n) | SheetCell::Date(n) => excel_serial_to_date(*n),
            SheetCell::Text(s) => parse_text_date(s.trim()),
            SheetCell::Empty => None,
        }
    }
}

/// 整数值去掉小数部分，学号 101.0 显示为 101
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Excel 序列号转日期（1900 日期系统，起点 1899-12-30）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(TimeDelta::try_days(serial.floor() as i64)?)
}

/// 支持 YYYY-MM-DD 和 DD-MM-YYYY，分隔符可以是 - 或 /
pub fn parse_text_date(text: &str) -> Option<NaiveDate> {
    // 去掉可能存在的时间部分
    let date_part = text.split(['T', ' ']).next().unwrap_or(text);
    ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// 要查找的测验列
#[derive(Debug, Clone)]
pub struct ColumnSpec<'a> {
    pub subject: &'a str,
    pub chapter: &'a str,
    pub test_date: NaiveDate,
    pub total_marks: i32,
}

/// 一行学生成绩的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Present(f64),
    Absent,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 工作表中的行号（从 1 开始）
    pub row: usize,
    pub roll: String,
    pub outcome: RowOutcome,
}

fn cell(grid: &[Vec<SheetCell>], row: usize, col: usize) -> &SheetCell {
    grid.get(row)
        .and_then(|r| r.get(col))
        .unwrap_or(&SheetCell::Empty)
}

/// 查找第一个科目、章节、日期、满分都匹配的列
pub fn find_test_column(grid: &[Vec<SheetCell>], spec: &ColumnSpec<'_>) -> Option<usize> {
    let width = grid.iter().take(TOTAL_ROW + 1).map(Vec::len).max()?;
    let subject = spec.subject.trim();
    let chapter = spec.chapter.trim();

    (0..width).find(|&col| {
        cell(grid, SUBJECT_ROW, col).text().as_deref() == Some(subject)
            && cell(grid, CHAPTER_ROW, col).text().as_deref() == Some(chapter)
            && cell(grid, DATE_ROW, col).date() == Some(spec.test_date)
            && cell(grid, TOTAL_ROW, col).number() == Some(f64::from(spec.total_marks))
    })
}

/// 解析单元格中的成绩
fn parse_mark(value: &SheetCell, total_marks: i32) -> RowOutcome {
    match value {
        SheetCell::Empty => RowOutcome::Absent,
        SheetCell::Text(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("a") => {
            RowOutcome::Absent
        }
        other => match other.number() {
            Some(score) if score >= 0.0 && score <= f64::from(total_marks) => {
                RowOutcome::Present(score)
            }
            Some(score) => RowOutcome::Invalid(format!(
                "Mark {} is outside 0..={total_marks}",
                format_number(score)
            )),
            None => RowOutcome::Invalid(format!(
                "Unrecognized mark value '{}'",
                other.text().unwrap_or_default()
            )),
        },
    }
}

/// 从 start_row 开始读取学生行，遇到学号为空的行停止
pub fn read_student_rows(
    grid: &[Vec<SheetCell>],
    column: usize,
    start_row: usize,
    total_marks: i32,
) -> Vec<ParsedRow> {
    let mut rows = Vec::new();
    for row in start_row..grid.len() {
        let Some(roll) = cell(grid, row, 0).text().filter(|r| !r.is_empty()) else {
            break;
        };
        rows.push(ParsedRow {
            row: row + 1,
            roll,
            outcome: parse_mark(cell(grid, row, column), total_marks),
        });
    }
    rows
}

/// 读取上传的工作簿，返回指定工作表的单元格网格（以 A1 为原点）
pub fn load_sheet(bytes: Vec<u8>, sheet_name: &str) -> Result<Vec<Vec<SheetCell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MarkSystemError::spreadsheet(format!("无法打开工作簿: {e}")))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(MarkSystemError::not_found(format!(
            "Sheet '{sheet_name}' not found in workbook"
        )));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| MarkSystemError::spreadsheet(format!("读取工作表失败: {e}")))?;

    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut grid: Vec<Vec<SheetCell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![SheetCell::Empty; start_col];
        cells.extend(row.iter().map(SheetCell::from));
        grid.push(cells);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SheetCell {
        SheetCell::Text(s.to_string())
    }

    fn num(n: f64) -> SheetCell {
        SheetCell::Number(n)
    }

    /// 两个测验列：第 3 列 Physics/Optics，第 4 列 Maths/Algebra
    fn sample_grid() -> Vec<Vec<SheetCell>> {
        vec![
            vec![text("Subject"), SheetCell::Empty, SheetCell::Empty, text("Physics"), text("Maths")],
            vec![text("Chapter"), SheetCell::Empty, SheetCell::Empty, text(" Optics "), text("Algebra")],
            // 45717 = 2025-03-01
            vec![text("Date"), SheetCell::Empty, SheetCell::Empty, SheetCell::Date(45717.0), text("02-03-2025")],
            vec![text("Total"), SheetCell::Empty, SheetCell::Empty, num(50.0), text("100")],
            vec![text("Roll"), text("Name"), text("College"), SheetCell::Empty, SheetCell::Empty],
            vec![num(11.0), text("Asha"), text("City"), num(42.0), num(88.0)],
            vec![num(12.0), text("Ravi"), text("City"), text("A"), num(120.0)],
            vec![num(13.0), text("Meera"), text("City"), SheetCell::Empty, text("x")],
            vec![SheetCell::Empty, SheetCell::Empty, SheetCell::Empty, num(1.0), num(1.0)],
            vec![num(14.0), text("After gap"), text("City"), num(10.0), num(10.0)],
        ]
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45717.0),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            excel_serial_to_date(45717.75),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(
            excel_serial_to_date(MAX_EXCEL_SERIAL),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(excel_serial_to_date(MAX_EXCEL_SERIAL + 1.0), None);
        assert_eq!(excel_serial_to_date(1e12), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
    }

    #[test]
    fn test_find_test_column_ignores_out_of_range_dates() {
        let mut grid = sample_grid();
        grid[2][3] = num(1e12);
        grid[2][4] = SheetCell::Date(f64::MAX);
        let physics = ColumnSpec {
            subject: "Physics",
            chapter: "Optics",
            test_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_marks: 50,
        };
        assert_eq!(find_test_column(&grid, &physics), None);
    }

    #[test]
    fn test_parse_text_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 2);
        assert_eq!(parse_text_date("2025-03-02"), expected);
        assert_eq!(parse_text_date("02-03-2025"), expected);
        assert_eq!(parse_text_date("2025-03-02T00:00:00"), expected);
        assert_eq!(parse_text_date("March 2"), None);
    }

    #[test]
    fn test_find_test_column_matches_all_fields() {
        let grid = sample_grid();
        let physics = ColumnSpec {
            subject: "Physics",
            chapter: "Optics",
            test_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_marks: 50,
        };
        assert_eq!(find_test_column(&grid, &physics), Some(3));

        let maths = ColumnSpec {
            subject: "Maths",
            chapter: "Algebra",
            test_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            total_marks: 100,
        };
        assert_eq!(find_test_column(&grid, &maths), Some(4));
    }

    #[test]
    fn test_find_test_column_rejects_partial_match() {
        let grid = sample_grid();
        let wrong_total = ColumnSpec {
            subject: "Physics",
            chapter: "Optics",
            test_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_marks: 40,
        };
        assert_eq!(find_test_column(&grid, &wrong_total), None);

        let wrong_date = ColumnSpec {
            total_marks: 50,
            test_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            ..wrong_total
        };
        assert_eq!(find_test_column(&grid, &wrong_date), None);
    }

    #[test]
    fn test_read_student_rows_stops_at_empty_roll() {
        let grid = sample_grid();
        let rows = read_student_rows(&grid, 3, 5, 50);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].roll, "11");
        assert_eq!(rows[0].row, 6);
        assert_eq!(rows[0].outcome, RowOutcome::Present(42.0));
        assert_eq!(rows[1].outcome, RowOutcome::Absent);
        assert_eq!(rows[2].outcome, RowOutcome::Absent);
    }

    #[test]
    fn test_read_student_rows_flags_invalid_marks() {
        let grid = sample_grid();
        let rows = read_student_rows(&grid, 4, 5, 100);

        assert_eq!(rows[0].outcome, RowOutcome::Present(88.0));
        assert!(matches!(rows[1].outcome, RowOutcome::Invalid(ref m) if m.contains("120")));
        assert!(matches!(rows[2].outcome, RowOutcome::Invalid(_)));
    }

    #[test]
    fn test_lowercase_absent_marker() {
        assert_eq!(parse_mark(&text("a"), 10), RowOutcome::Absent);
        assert_eq!(parse_mark(&text(" A "), 10), RowOutcome::Absent);
        assert_eq!(parse_mark(&text("7.5"), 10), RowOutcome::Present(7.5));
    }
}
