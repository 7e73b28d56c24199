use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    dashboard::responses::DashboardStats,
    marks::{
        entities::Mark,
        requests::{MarkEntry, MarkRequest},
    },
    reports::{entities::ReportRow, requests::ReportQuery},
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListParams, UpdateStudentRequest},
    },
    tests::{
        entities::Test,
        requests::{CreateTestRequest, TestListParams},
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 存储层接口
///
/// 除用户管理外，所有方法都以机构用户 `user_id` 作为数据范围，
/// 不属于该用户的记录一律视为不存在。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 学生管理方法
    async fn create_student(&self, user_id: i64, req: CreateStudentRequest) -> Result<Student>;
    async fn get_student(&self, user_id: i64, student_id: i64) -> Result<Option<Student>>;
    // 按姓名排序
    async fn list_students(&self, user_id: i64, params: StudentListParams) -> Result<Vec<Student>>;
    // 只返回属于该用户的学生
    async fn get_students_by_ids(&self, user_id: i64, ids: &[i64]) -> Result<Vec<Student>>;
    async fn update_student(
        &self,
        user_id: i64,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    async fn delete_student(&self, user_id: i64, student_id: i64) -> Result<bool>;

    /// 测验管理方法
    async fn create_test(&self, user_id: i64, req: CreateTestRequest) -> Result<Test>;
    async fn get_test(&self, user_id: i64, test_id: i64) -> Result<Option<Test>>;
    // 按日期倒序
    async fn list_tests(&self, user_id: i64, params: TestListParams) -> Result<Vec<Test>>;
    // 按科目、章节、日期查找测验
    async fn find_test(
        &self,
        user_id: i64,
        subject: &str,
        chapter: &str,
        test_date: NaiveDate,
    ) -> Result<Option<Test>>;
    async fn delete_test(&self, user_id: i64, test_id: i64) -> Result<bool>;
    // 在同一事务中创建测验和全部成绩
    async fn create_test_with_marks(
        &self,
        user_id: i64,
        req: CreateTestRequest,
        marks: Vec<MarkEntry>,
    ) -> Result<(Test, Vec<Mark>)>;

    /// 成绩管理方法
    // 该用户所有测验下的成绩
    async fn list_marks(&self, user_id: i64) -> Result<Vec<Mark>>;
    async fn list_marks_by_student(&self, student_id: i64) -> Result<Vec<Mark>>;
    async fn list_marks_by_test(&self, test_id: i64) -> Result<Vec<Mark>>;
    async fn get_mark(&self, student_id: i64, test_id: i64) -> Result<Option<Mark>>;
    async fn create_mark(&self, req: MarkRequest) -> Result<Mark>;
    async fn update_mark(
        &self,
        student_id: i64,
        test_id: i64,
        marks_obtained: Option<f64>,
    ) -> Result<Option<Mark>>;
    // 在同一事务中插入或更新某个测验的成绩
    async fn upsert_marks(&self, test_id: i64, marks: Vec<MarkEntry>) -> Result<Vec<Mark>>;

    /// 报表与统计
    // 按学生姓名、测验日期排序
    async fn report_rows(&self, user_id: i64, query: ReportQuery) -> Result<Vec<ReportRow>>;
    async fn dashboard_stats(
        &self,
        user_id: i64,
        recent_since: NaiveDate,
    ) -> Result<DashboardStats>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
