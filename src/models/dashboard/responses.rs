use serde::Serialize;
use ts_rs::TS;

// 首页统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_tests: i64,
    /// 最近 30 天内的测验数
    pub recent_tests: i64,
    /// 所有已录入（非缺考）成绩的平均百分比
    pub average_percentage: Option<f64>,
}
