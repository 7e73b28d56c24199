use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩实体，marks_obtained 为 None 表示缺考
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct Mark {
    pub id: i64,
    pub student_id: i64,
    pub test_id: i64,
    pub marks_obtained: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
