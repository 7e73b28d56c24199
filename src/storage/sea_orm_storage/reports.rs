//! 报表与首页统计查询

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::marks::{Column as MarkColumn, Entity as Marks};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::tests::{Column as TestColumn, Entity as Tests};
use crate::errors::{MarkSystemError, Result};
use crate::models::{
    dashboard::responses::DashboardStats,
    reports::{entities::ReportRow, requests::ReportQuery},
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

impl SeaOrmStorage {
    /// 查询报表行
    ///
    /// 先按用户和日期区间筛选测验，再取这些测验下的成绩并关联学生。
    /// 年级筛选作用于学生本身的年级。
    pub async fn report_rows_impl(&self, user_id: i64, query: ReportQuery) -> Result<Vec<ReportRow>> {
        let mut tests_select = Tests::find().filter(TestColumn::UserId.eq(user_id));

        if let Some(from) = query.from {
            tests_select = tests_select.filter(TestColumn::TestDate.gte(from));
        }
        if let Some(to) = query.to {
            tests_select = tests_select.filter(TestColumn::TestDate.lte(to));
        }
        let tests: HashMap<i64, _> = tests_select
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询报表测验失败: {e}")))?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        if tests.is_empty() {
            return Ok(Vec::new());
        }

        let mut marks_select =
            Marks::find().filter(MarkColumn::TestId.is_in(tests.keys().copied()));
        if let Some(ids) = query.student_ids {
            marks_select = marks_select.filter(MarkColumn::StudentId.is_in(ids));
        }

        let mut joined = marks_select
            .find_also_related(Students)
            .filter(StudentColumn::UserId.eq(user_id));
        if let Some(standard) = query.standard.as_deref().map(str::trim)
            && !standard.is_empty()
        {
            joined = joined.filter(StudentColumn::Standard.eq(standard));
        }

        let pairs = joined
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询报表成绩失败: {e}")))?;

        let mut rows: Vec<ReportRow> = pairs
            .into_iter()
            .filter_map(|(mark, student)| {
                let student = student?;
                let test = tests.get(&mark.test_id)?;
                Some(ReportRow {
                    student_id: student.id,
                    student_name: student.name,
                    student_email: student.email,
                    standard: student.standard,
                    test_id: test.id,
                    subject: test.subject.clone(),
                    chapter: test.chapter.clone(),
                    total_marks: test.total_marks,
                    test_date: test.test_date,
                    marks_obtained: mark.marks_obtained,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            a.student_name
                .cmp(&b.student_name)
                .then(a.student_id.cmp(&b.student_id))
                .then(a.test_date.cmp(&b.test_date))
                .then(a.test_id.cmp(&b.test_id))
        });

        Ok(rows)
    }

    /// 首页统计
    pub async fn dashboard_stats_impl(
        &self,
        user_id: i64,
        recent_since: NaiveDate,
    ) -> Result<DashboardStats> {
        let total_students = Students::find()
            .filter(StudentColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("统计学生数量失败: {e}")))?;

        let total_tests = Tests::find()
            .filter(TestColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("统计测验数量失败: {e}")))?;

        let recent_tests = Tests::find()
            .filter(TestColumn::UserId.eq(user_id))
            .filter(TestColumn::TestDate.gte(recent_since))
            .count(&self.db)
            .await
            .map_err(|e| {
                MarkSystemError::database_operation(format!("统计近期测验数量失败: {e}"))
            })?;

        // 缺考不计入平均分
        let recorded = Marks::find()
            .filter(MarkColumn::MarksObtained.is_not_null())
            .find_also_related(Tests)
            .filter(TestColumn::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询成绩失败: {e}")))?;

        let percentages: Vec<f64> = recorded
            .into_iter()
            .filter_map(|(mark, test)| {
                let test = test?;
                let obtained = mark.marks_obtained?;
                (test.total_marks > 0).then(|| obtained / f64::from(test.total_marks) * 100.0)
            })
            .collect();

        let average_percentage = if percentages.is_empty() {
            None
        } else {
            let avg = percentages.iter().sum::<f64>() / percentages.len() as f64;
            Some((avg * 100.0).round() / 100.0)
        };

        Ok(DashboardStats {
            total_students: total_students as i64,
            total_tests: total_tests as i64,
            recent_tests: recent_tests as i64,
            average_percentage,
        })
    }
}
