//! 成绩存储操作

use super::SeaOrmStorage;
use crate::entity::marks::{ActiveModel, Column, Entity as Marks, Relation};
use crate::entity::tests::Column as TestColumn;
use crate::errors::{MarkSystemError, Result};
use crate::models::marks::{
    entities::Mark,
    requests::{MarkEntry, MarkRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 列出该用户所有测验下的成绩
    pub async fn list_marks_impl(&self, user_id: i64) -> Result<Vec<Mark>> {
        let marks = Marks::find()
            .join(JoinType::InnerJoin, Relation::Test.def())
            .filter(TestColumn::UserId.eq(user_id))
            .order_by_asc(Column::TestId)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询成绩列表失败: {e}")))?;

        Ok(marks.into_iter().map(|m| m.into_mark()).collect())
    }

    /// 列出某个学生的成绩
    pub async fn list_marks_by_student_impl(&self, student_id: i64) -> Result<Vec<Mark>> {
        let marks = Marks::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::TestId)
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询学生成绩失败: {e}")))?;

        Ok(marks.into_iter().map(|m| m.into_mark()).collect())
    }

    /// 列出某个测验的成绩
    pub async fn list_marks_by_test_impl(&self, test_id: i64) -> Result<Vec<Mark>> {
        let marks = Marks::find()
            .filter(Column::TestId.eq(test_id))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询测验成绩失败: {e}")))?;

        Ok(marks.into_iter().map(|m| m.into_mark()).collect())
    }

    /// 获取某个学生在某个测验中的成绩
    pub async fn get_mark_impl(&self, student_id: i64, test_id: i64) -> Result<Option<Mark>> {
        let result = Marks::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::TestId.eq(test_id))
            .one(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_mark()))
    }

    /// 录入成绩；(student_id, test_id) 重复时数据库返回唯一约束错误
    pub async fn create_mark_impl(&self, req: MarkRequest) -> Result<Mark> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(req.student_id),
            test_id: Set(req.test_id),
            marks_obtained: Set(req.marks_obtained),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| MarkSystemError::from_db_write("录入成绩失败", e))?;

        Ok(result.into_mark())
    }

    /// 更新成绩
    pub async fn update_mark_impl(
        &self,
        student_id: i64,
        test_id: i64,
        marks_obtained: Option<f64>,
    ) -> Result<Option<Mark>> {
        let existing = Marks::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::TestId.eq(test_id))
            .one(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询成绩失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.marks_obtained = Set(marks_obtained);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("更新成绩失败: {e}")))?;

        Ok(Some(result.into_mark()))
    }

    /// 在一个事务中插入或更新某个测验的成绩
    pub async fn upsert_marks_impl(&self, test_id: i64, marks: Vec<MarkEntry>) -> Result<Vec<Mark>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let mut saved = Vec::with_capacity(marks.len());

        for entry in marks {
            let existing = Marks::find()
                .filter(Column::StudentId.eq(entry.student_id))
                .filter(Column::TestId.eq(test_id))
                .one(&txn)
                .await
                .map_err(|e| MarkSystemError::database_operation(format!("查询成绩失败: {e}")))?;

            let model = match existing {
                Some(existing) => {
                    let mut model: ActiveModel = existing.into();
                    model.marks_obtained = Set(entry.marks_obtained);
                    model.updated_at = Set(now);
                    model.update(&txn).await
                }
                None => {
                    ActiveModel {
                        student_id: Set(entry.student_id),
                        test_id: Set(test_id),
                        marks_obtained: Set(entry.marks_obtained),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                }
            }
            .map_err(|e| {
                MarkSystemError::database_operation(format!(
                    "保存学生 {} 的成绩失败: {e}",
                    entry.student_id
                ))
            })?;

            saved.push(model.into_mark());
        }

        txn.commit()
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(saved)
    }
}
