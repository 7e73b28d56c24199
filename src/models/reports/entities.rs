use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 报表中的一行：某个学生在某次测验中的成绩
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportRow {
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub standard: String,
    pub test_id: i64,
    pub subject: String,
    pub chapter: String,
    pub total_marks: i32,
    pub test_date: NaiveDate,
    pub marks_obtained: Option<f64>,
}

impl ReportRow {
    /// 得分百分比，缺考时为 None
    pub fn percentage(&self) -> Option<f64> {
        match self.marks_obtained {
            Some(obtained) if self.total_marks > 0 => {
                Some(obtained / f64::from(self.total_marks) * 100.0)
            }
            _ => None,
        }
    }
}

// 单个学生的汇总统计，只统计实际参加的测验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportSummary {
    pub total_tests: usize,
    pub attended: usize,
    pub total_obtained: f64,
    pub total_possible: i64,
    pub average_percentage: Option<f64>,
    pub highest_percentage: Option<f64>,
    pub lowest_percentage: Option<f64>,
    pub grade: Option<String>,
}

impl ReportSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ReportRow>) -> Self {
        let mut total_tests = 0;
        let mut attended = 0;
        let mut total_obtained = 0.0;
        let mut total_possible = 0i64;
        let mut percentages = Vec::new();

        for row in rows {
            total_tests += 1;
            if let (Some(obtained), Some(pct)) = (row.marks_obtained, row.percentage()) {
                attended += 1;
                total_obtained += obtained;
                total_possible += i64::from(row.total_marks);
                percentages.push(pct);
            }
        }

        let average_percentage = if percentages.is_empty() {
            None
        } else {
            Some(round2(percentages.iter().sum::<f64>() / percentages.len() as f64))
        };
        let highest_percentage = percentages.iter().copied().reduce(f64::max).map(round2);
        let lowest_percentage = percentages.iter().copied().reduce(f64::min).map(round2);

        Self {
            total_tests,
            attended,
            total_obtained,
            total_possible,
            average_percentage,
            highest_percentage,
            lowest_percentage,
            grade: average_percentage.map(|avg| grade_for(avg).to_string()),
        }
    }
}

/// 百分比对应的等级
pub fn grade_for(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "A+",
        p if p >= 80.0 => "A",
        p if p >= 70.0 => "B",
        p if p >= 60.0 => "C",
        _ => "F",
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// 按学生分组的报表
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentReport {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub standard: String,
    pub summary: ReportSummary,
    pub rows: Vec<ReportRow>,
}

/// 将按学生、日期排序的行分组，同一学生的行必须相邻
pub fn group_by_student(rows: Vec<ReportRow>) -> Vec<StudentReport> {
    let mut reports: Vec<StudentReport> = Vec::new();
    for row in rows {
        match reports
            .last_mut()
            .filter(|r| r.student_id == row.student_id)
        {
            Some(report) => report.rows.push(row),
            None => reports.push(StudentReport {
                student_id: row.student_id,
                name: row.student_name.clone(),
                email: row.student_email.clone(),
                standard: row.standard.clone(),
                summary: ReportSummary::from_rows(std::iter::empty()),
                rows: vec![row],
            }),
        }
    }
    for report in &mut reports {
        report.summary = ReportSummary::from_rows(&report.rows);
    }
    reports
}
