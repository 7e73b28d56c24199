//! 报表导出为 Excel

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use super::{
    ReportService, ReportWindow,
    query::{custom_window, load_reports},
};
use crate::errors::Result;
use crate::models::reports::entities::StudentReport;
use crate::models::{ApiResponse, ErrorCode, reports::requests::CustomReportRequest};
use crate::services::current_user_id;

const SUMMARY_HEADERS: [&str; 12] = [
    "Student ID",
    "Name",
    "Email",
    "Standard",
    "Tests",
    "Attended",
    "Obtained",
    "Possible",
    "Average %",
    "Highest %",
    "Lowest %",
    "Grade",
];

const DETAIL_HEADERS: [&str; 9] = [
    "Student ID",
    "Name",
    "Standard",
    "Test Date",
    "Subject",
    "Chapter",
    "Total Marks",
    "Marks Obtained",
    "Percentage",
];

pub async fn export_report(
    service: &ReportService,
    request: &HttpRequest,
    body: CustomReportRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let window = match custom_window(&body) {
        Ok(window) => window,
        Err(response) => return Ok(response),
    };
    let student_ids = body.student_id.map(|id| vec![id]);
    let reports = match load_reports(&storage, user_id, &window, body.standard, student_ids).await
    {
        Ok(reports) => reports,
        Err(response) => return Ok(response),
    };

    match generate_xlsx(&window, &reports) {
        Ok(buffer) => {
            let filename = format!(
                "report_{}_{}.xlsx",
                body.from.format("%Y%m%d"),
                body.to.format("%Y%m%d")
            );
            Ok(HttpResponse::Ok()
                .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{filename}\""),
                ))
                .body(buffer))
        }
        Err(e) => {
            tracing::error!("Failed to generate XLSX: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to generate report: {}", e.message()),
                )),
            )
        }
    }
}

/// 生成两张工作表：学生汇总和成绩明细
pub(crate) fn generate_xlsx(window: &ReportWindow, reports: &[StudentReport]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let title_format = Format::new().set_bold().set_font_size(14);

    let summary = workbook.add_worksheet().set_name("Summary")?;
    write_summary_sheet(summary, &header_format, &title_format, window, reports)?;

    let details = workbook.add_worksheet().set_name("Details")?;
    write_detail_sheet(details, &header_format, reports)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    header_format: &Format,
    title_format: &Format,
    window: &ReportWindow,
    reports: &[StudentReport],
) -> Result<()> {
    sheet.write_string_with_format(
        0,
        0,
        format!("{} ({})", window.title, window.range_label()),
        title_format,
    )?;

    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(2, col as u16, *header, header_format)?;
    }

    for (i, report) in reports.iter().enumerate() {
        let row = 3 + i as u32;
        let s = &report.summary;
        sheet.write_number(row, 0, report.student_id as f64)?;
        sheet.write_string(row, 1, &report.name)?;
        sheet.write_string(row, 2, &report.email)?;
        sheet.write_string(row, 3, &report.standard)?;
        sheet.write_number(row, 4, s.total_tests as f64)?;
        sheet.write_number(row, 5, s.attended as f64)?;
        sheet.write_number(row, 6, s.total_obtained)?;
        sheet.write_number(row, 7, s.total_possible as f64)?;
        for (col, value) in [
            (8, s.average_percentage),
            (9, s.highest_percentage),
            (10, s.lowest_percentage),
        ] {
            match value {
                Some(pct) => sheet.write_number(row, col, pct)?,
                None => sheet.write_string(row, col, "-")?,
            };
        }
        sheet.write_string(row, 11, s.grade.as_deref().unwrap_or("-"))?;
    }

    sheet.set_column_width(1, 24)?;
    sheet.set_column_width(2, 30)?;
    Ok(())
}

fn write_detail_sheet(
    sheet: &mut Worksheet,
    header_format: &Format,
    reports: &[StudentReport],
) -> Result<()> {
    for (col, header) in DETAIL_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    let mut row = 1u32;
    for report in reports {
        for r in &report.rows {
            sheet.write_number(row, 0, r.student_id as f64)?;
            sheet.write_string(row, 1, &r.student_name)?;
            sheet.write_string(row, 2, &r.standard)?;
            sheet.write_string(row, 3, r.test_date.format("%Y-%m-%d").to_string())?;
            sheet.write_string(row, 4, &r.subject)?;
            sheet.write_string(row, 5, &r.chapter)?;
            sheet.write_number(row, 6, f64::from(r.total_marks))?;
            match r.marks_obtained {
                Some(marks) => sheet.write_number(row, 7, marks)?,
                None => sheet.write_string(row, 7, "A")?,
            };
            match r.percentage() {
                Some(pct) => sheet.write_number(row, 8, (pct * 100.0).round() / 100.0)?,
                None => sheet.write_string(row, 8, "-")?,
            };
            row += 1;
        }
    }

    sheet.set_column_width(1, 24)?;
    sheet.set_column_width(5, 24)?;
    Ok(())
}
