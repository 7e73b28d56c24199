use serde::Deserialize;
use ts_rs::TS;

// 单条成绩，兼容前端的 studentId / testId / score 字段名
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkRequest {
    #[serde(alias = "studentId")]
    pub student_id: i64,
    #[serde(alias = "testId")]
    pub test_id: i64,
    #[serde(alias = "score", default)]
    pub marks_obtained: Option<f64>,
}

// 某个测验下的一条成绩（测验 id 由外层提供）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkEntry {
    #[serde(alias = "studentId")]
    pub student_id: i64,
    #[serde(alias = "score", default)]
    pub marks_obtained: Option<f64>,
}

// 批量录入/更新成绩
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct BulkMarksRequest {
    #[serde(alias = "testId")]
    pub test_id: i64,
    pub marks: Vec<MarkEntry>,
}
