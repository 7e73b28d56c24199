//! 报表 HTML 生成（打印页面与邮件正文共用）

use std::fmt::Write;

use super::ReportWindow;
use crate::models::reports::entities::{ReportRow, StudentReport};
use crate::models::users::entities::User;
use crate::utils::escape_html;

const STYLE: &str = r#"
body { font-family: Arial, Helvetica, sans-serif; color: #222; margin: 24px; }
.letterhead { text-align: center; border-bottom: 2px solid #333; padding-bottom: 8px; margin-bottom: 16px; }
.letterhead h1 { margin: 0; font-size: 22px; }
.letterhead p { margin: 2px 0; font-size: 13px; }
.student { page-break-inside: avoid; margin-bottom: 28px; }
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { border: 1px solid #999; padding: 4px 6px; text-align: left; }
th { background: #f0f0f0; }
.absent { color: #a00; }
.summary td { font-weight: bold; }
@media print { body { margin: 0; } }
"#;

/// 报表页眉
#[derive(Debug, Clone)]
pub struct Letterhead {
    pub institute_name: String,
    pub tagline: Option<String>,
    pub address: Option<String>,
}

impl Letterhead {
    pub fn from_user(user: &User) -> Self {
        Self {
            institute_name: user.display_institute().to_string(),
            tagline: user.institute.tagline.clone(),
            address: user.institute.institute_address.clone(),
        }
    }

    fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"letterhead\">");
        let _ = write!(html, "<h1>{}</h1>", escape_html(&self.institute_name));
        if let Some(tagline) = self.tagline.as_deref().filter(|t| !t.is_empty()) {
            let _ = write!(html, "<p><em>{}</em></p>", escape_html(tagline));
        }
        if let Some(address) = self.address.as_deref().filter(|a| !a.is_empty()) {
            let _ = write!(html, "<p>{}</p>", escape_html(address));
        }
        html.push_str("</div>");
        html
    }
}

fn format_percentage(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}%"))
}

fn format_marks(row: &ReportRow) -> String {
    match row.marks_obtained {
        Some(marks) if marks.fract() == 0.0 => format!("{marks:.0}"),
        Some(marks) => format!("{marks}"),
        None => "Absent".to_string(),
    }
}

/// 单个学生的成绩表和汇总
pub fn render_student_section(report: &StudentReport) -> String {
    let mut html = String::from("<div class=\"student\">");
    let _ = write!(
        html,
        "<h2>{}</h2><p>Standard: {} &middot; Email: {}</p>",
        escape_html(&report.name),
        escape_html(&report.standard),
        escape_html(&report.email)
    );

    html.push_str(
        "<table><thead><tr><th>Date</th><th>Subject</th><th>Chapter</th>\
         <th>Marks</th><th>Total</th><th>Percentage</th></tr></thead><tbody>",
    );
    for row in &report.rows {
        let class = if row.marks_obtained.is_none() {
            " class=\"absent\""
        } else {
            ""
        };
        let _ = write!(
            html,
            "<tr{class}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.test_date.format("%d-%m-%Y"),
            escape_html(&row.subject),
            escape_html(&row.chapter),
            format_marks(row),
            row.total_marks,
            format_percentage(row.percentage().map(|p| (p * 100.0).round() / 100.0)),
        );
    }

    let summary = &report.summary;
    let _ = write!(
        html,
        "</tbody></table><table class=\"summary\"><tr>\
         <td>Tests: {}</td><td>Attended: {}</td><td>Obtained: {} / {}</td>\
         <td>Average: {}</td><td>Highest: {}</td><td>Lowest: {}</td><td>Grade: {}</td>\
         </tr></table></div>",
        summary.total_tests,
        summary.attended,
        summary.total_obtained,
        summary.total_possible,
        format_percentage(summary.average_percentage),
        format_percentage(summary.highest_percentage),
        format_percentage(summary.lowest_percentage),
        summary.grade.as_deref().unwrap_or("-"),
    );
    html
}

fn document(title: &str, body: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{STYLE}</style></head><body>{body}{script}</body></html>",
        escape_html(title)
    )
}

/// 可打印的完整报表，加载后自动打开浏览器打印对话框
pub fn render_print_document(
    letterhead: &Letterhead,
    window: &ReportWindow,
    reports: &[StudentReport],
) -> String {
    let mut body = letterhead.to_html();
    let _ = write!(
        body,
        "<h2 style=\"text-align:center\">{} ({})</h2>",
        window.title,
        window.range_label()
    );
    for report in reports {
        body.push_str(&render_student_section(report));
    }
    document(
        window.title,
        &body,
        "<script>window.onload = function () { window.print(); };</script>",
    )
}

/// 发给单个学生的邮件正文
pub fn render_email(letterhead: &Letterhead, window: &ReportWindow, report: &StudentReport) -> String {
    let mut body = letterhead.to_html();
    let _ = write!(
        body,
        "<p>Dear {},</p><p>Please find below your {} for {}.</p>",
        escape_html(&report.name),
        window.title.to_lowercase(),
        window.range_label()
    );
    body.push_str(&render_student_section(report));
    let _ = write!(
        body,
        "<p>Regards,<br>{}</p>",
        escape_html(&letterhead.institute_name)
    );
    document(window.title, &body, "")
}

/// 邮件主题
pub fn email_subject(letterhead: &Letterhead, window: &ReportWindow) -> String {
    format!(
        "{} - {} ({})",
        letterhead.institute_name,
        window.title,
        window.range_label()
    )
}
