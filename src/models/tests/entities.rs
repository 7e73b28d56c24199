use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 测验实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/test.ts")]
pub struct Test {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub chapter: String,
    pub total_marks: i32,
    pub test_date: NaiveDate,
    pub standard: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Test {
    /// 分数是否在 0..=total_marks 范围内
    pub fn accepts_score(&self, score: f64) -> bool {
        score.is_finite() && score >= 0.0 && score <= f64::from(self.total_marks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Test {
        Test {
            id: 1,
            user_id: 1,
            subject: "Physics".into(),
            chapter: "Optics".into(),
            total_marks: 50,
            test_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            standard: "12".into(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_accepts_score_bounds() {
        let test = sample();
        assert!(test.accepts_score(0.0));
        assert!(test.accepts_score(50.0));
        assert!(test.accepts_score(37.5));
        assert!(!test.accepts_score(50.5));
        assert!(!test.accepts_score(-1.0));
        assert!(!test.accepts_score(f64::NAN));
    }
}
