//! 学生存储操作

use super::SeaOrmStorage;
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{MarkSystemError, Result};
use crate::models::students::{
    entities::Student,
    requests::{CreateStudentRequest, StudentListParams, UpdateStudentRequest},
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(
        &self,
        user_id: i64,
        req: CreateStudentRequest,
    ) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(user_id),
            name: Set(req.name),
            email: Set(req.email),
            standard: Set(req.standard),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("创建学生失败: {e}")))?;

        Ok(result.into_student())
    }

    /// 获取属于该用户的学生
    pub async fn get_student_impl(&self, user_id: i64, student_id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(student_id)
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 列出学生
    pub async fn list_students_impl(
        &self,
        user_id: i64,
        params: StudentListParams,
    ) -> Result<Vec<Student>> {
        let mut select = Students::find().filter(Column::UserId.eq(user_id));

        // 年级筛选
        if let Some(ref standard) = params.standard
            && !standard.trim().is_empty()
        {
            select = select.filter(Column::Standard.eq(standard.trim()));
        }

        // 搜索条件
        if let Some(ref search) = params.search
            && !search.trim().is_empty()
        {
            let pattern = format!("%{}%", escape_like_pattern(search.trim()));
            select = select.filter(
                Condition::any()
                    .add(Column::Name.like(LikeExpr::new(&pattern).escape('\\')))
                    .add(Column::Email.like(LikeExpr::new(&pattern).escape('\\'))),
            );
        }

        let students = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    /// 批量获取学生
    pub async fn get_students_by_ids_impl(
        &self,
        user_id: i64,
        ids: &[i64],
    ) -> Result<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let students = Students::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    /// 更新学生
    pub async fn update_student_impl(
        &self,
        user_id: i64,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        // 先检查学生是否存在且属于该用户
        if self.get_student_impl(user_id, student_id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(student_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(standard) = update.standard {
            model.standard = Set(standard);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("更新学生失败: {e}")))?;

        Ok(Some(result.into_student()))
    }

    /// 删除学生，成绩通过外键级联删除
    pub async fn delete_student_impl(&self, user_id: i64, student_id: i64) -> Result<bool> {
        let result = Students::delete_many()
            .filter(Column::Id.eq(student_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("删除学生失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
