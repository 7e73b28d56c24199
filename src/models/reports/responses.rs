use super::entities::{ReportRow, ReportSummary, StudentReport};
use crate::models::students::entities::Student;
use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportResponse {
    pub title: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub students: Vec<StudentReport>,
}

// 单个学生的成绩历史
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentResultResponse {
    pub student: Student,
    pub summary: ReportSummary,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct FailedDelivery {
    pub student_id: i64,
    pub email: String,
    pub error: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct SendEmailsResponse {
    pub sent: usize,
    pub failed: Vec<FailedDelivery>,
}
