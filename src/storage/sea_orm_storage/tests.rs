//! 测验存储操作

use super::SeaOrmStorage;
use crate::entity::marks::ActiveModel as MarkActiveModel;
use crate::entity::tests::{ActiveModel, Column, Entity as Tests};
use crate::errors::{MarkSystemError, Result};
use crate::models::{
    marks::{entities::Mark, requests::MarkEntry},
    tests::{
        entities::Test,
        requests::{CreateTestRequest, TestListParams},
    },
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    fn new_test_model(user_id: i64, req: CreateTestRequest) -> ActiveModel {
        ActiveModel {
            user_id: Set(user_id),
            subject: Set(req.subject),
            chapter: Set(req.chapter),
            total_marks: Set(req.total_marks),
            test_date: Set(req.test_date),
            standard: Set(req.standard),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
    }

    /// 创建测验
    pub async fn create_test_impl(&self, user_id: i64, req: CreateTestRequest) -> Result<Test> {
        let result = Self::new_test_model(user_id, req)
            .insert(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("创建测验失败: {e}")))?;

        Ok(result.into_test())
    }

    /// 获取属于该用户的测验
    pub async fn get_test_impl(&self, user_id: i64, test_id: i64) -> Result<Option<Test>> {
        let result = Tests::find_by_id(test_id)
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_test()))
    }

    /// 列出测验（最新的在前）
    pub async fn list_tests_impl(&self, user_id: i64, params: TestListParams) -> Result<Vec<Test>> {
        let mut select = Tests::find().filter(Column::UserId.eq(user_id));

        if let Some(ref standard) = params.standard
            && !standard.trim().is_empty()
        {
            select = select.filter(Column::Standard.eq(standard.trim()));
        }

        let tests = select
            .order_by_desc(Column::TestDate)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询测验列表失败: {e}")))?;

        Ok(tests.into_iter().map(|m| m.into_test()).collect())
    }

    /// 按科目、章节和日期查找测验
    pub async fn find_test_impl(
        &self,
        user_id: i64,
        subject: &str,
        chapter: &str,
        test_date: NaiveDate,
    ) -> Result<Option<Test>> {
        let result = Tests::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Subject.eq(subject))
            .filter(Column::Chapter.eq(chapter))
            .filter(Column::TestDate.eq(test_date))
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_test()))
    }

    /// 删除测验，成绩通过外键级联删除
    pub async fn delete_test_impl(&self, user_id: i64, test_id: i64) -> Result<bool> {
        let result = Tests::delete_many()
            .filter(Column::Id.eq(test_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("删除测验失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 在一个事务中创建测验和成绩，任一步失败则全部回滚
    pub async fn create_test_with_marks_impl(
        &self,
        user_id: i64,
        req: CreateTestRequest,
        marks: Vec<MarkEntry>,
    ) -> Result<(Test, Vec<Mark>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let test = Self::new_test_model(user_id, req)
            .insert(&txn)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("创建测验失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let mut created = Vec::with_capacity(marks.len());
        for entry in marks {
            let mark = MarkActiveModel {
                student_id: Set(entry.student_id),
                test_id: Set(test.id),
                marks_obtained: Set(entry.marks_obtained),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                MarkSystemError::database_operation(format!(
                    "录入学生 {} 的成绩失败: {e}",
                    entry.student_id
                ))
            })?;
            created.push(mark.into_mark());
        }

        txn.commit()
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((test.into_test(), created))
    }
}
