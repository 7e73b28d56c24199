use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

// 报表周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub enum ReportPeriod {
    Custom,
    Weekly,
    Monthly,
}

// 自定义区间报表（打印、导出也使用同样的请求体）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct CustomReportRequest {
    #[serde(alias = "startDate")]
    pub from: NaiveDate,
    #[serde(alias = "endDate")]
    pub to: NaiveDate,
    #[serde(default)]
    pub standard: Option<String>,
    #[serde(default, alias = "studentId")]
    pub student_id: Option<i64>,
}

// 周报 / 月报
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct PeriodReportRequest {
    #[serde(default)]
    pub standard: Option<String>,
}

// 群发成绩邮件
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct SendEmailsRequest {
    pub period: ReportPeriod,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub standard: Option<String>,
    /// 为空时发送给区间内有成绩的全部学生
    #[serde(default)]
    pub student_ids: Option<Vec<i64>>,
}

// 报表查询条件（用于存储层），日期区间为闭区间
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub standard: Option<String>,
    pub student_ids: Option<Vec<i64>>,
}
