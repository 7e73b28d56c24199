//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod marks;
mod reports;
mod students;
mod tests;
mod users;

use crate::config::AppConfig;
use crate::errors::{MarkSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| MarkSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    ///
    /// 内存数据库只能使用单个连接，否则每个连接都会看到一个独立的空库。
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| MarkSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        let mut pool_options = SqlitePoolOptions::new()
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(timeout));

        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(pool_size)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .connect_with(opt)
            .await
            .map_err(|e| MarkSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| MarkSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(MarkSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 学生模块
    async fn create_student(&self, user_id: i64, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(user_id, req).await
    }

    async fn get_student(&self, user_id: i64, student_id: i64) -> Result<Option<Student>> {
        self.get_student_impl(user_id, student_id).await
    }

    async fn list_students(&self, user_id: i64, params: StudentListParams) -> Result<Vec<Student>> {
        self.list_students_impl(user_id, params).await
    }

    async fn get_students_by_ids(&self, user_id: i64, ids: &[i64]) -> Result<Vec<Student>> {
        self.get_students_by_ids_impl(user_id, ids).await
    }

    async fn update_student(
        &self,
        user_id: i64,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(user_id, student_id, update).await
    }

    async fn delete_student(&self, user_id: i64, student_id: i64) -> Result<bool> {
        self.delete_student_impl(user_id, student_id).await
    }

    // 测验模块
    async fn create_test(&self, user_id: i64, req: CreateTestRequest) -> Result<Test> {
        self.create_test_impl(user_id, req).await
    }

    async fn get_test(&self, user_id: i64, test_id: i64) -> Result<Option<Test>> {
        self.get_test_impl(user_id, test_id).await
    }

    async fn list_tests(&self, user_id: i64, params: TestListParams) -> Result<Vec<Test>> {
        self.list_tests_impl(user_id, params).await
    }

    async fn find_test(
        &self,
        user_id: i64,
        subject: &str,
        chapter: &str,
        test_date: NaiveDate,
    ) -> Result<Option<Test>> {
        self.find_test_impl(user_id, subject, chapter, test_date)
            .await
    }

    async fn delete_test(&self, user_id: i64, test_id: i64) -> Result<bool> {
        self.delete_test_impl(user_id, test_id).await
    }

    async fn create_test_with_marks(
        &self,
        user_id: i64,
        req: CreateTestRequest,
        marks: Vec<MarkEntry>,
    ) -> Result<(Test, Vec<Mark>)> {
        self.create_test_with_marks_impl(user_id, req, marks).await
    }

    // 成绩模块
    async fn list_marks(&self, user_id: i64) -> Result<Vec<Mark>> {
        self.list_marks_impl(user_id).await
    }

    async fn list_marks_by_student(&self, student_id: i64) -> Result<Vec<Mark>> {
        self.list_marks_by_student_impl(student_id).await
    }

    async fn list_marks_by_test(&self, test_id: i64) -> Result<Vec<Mark>> {
        self.list_marks_by_test_impl(test_id).await
    }

    async fn get_mark(&self, student_id: i64, test_id: i64) -> Result<Option<Mark>> {
        self.get_mark_impl(student_id, test_id).await
    }

    async fn create_mark(&self, req: MarkRequest) -> Result<Mark> {
        self.create_mark_impl(req).await
    }

    async fn update_mark(
        &self,
        student_id: i64,
        test_id: i64,
        marks_obtained: Option<f64>,
    ) -> Result<Option<Mark>> {
        self.update_mark_impl(student_id, test_id, marks_obtained)
            .await
    }

    async fn upsert_marks(&self, test_id: i64, marks: Vec<MarkEntry>) -> Result<Vec<Mark>> {
        self.upsert_marks_impl(test_id, marks).await
    }

    // 报表模块
    async fn report_rows(&self, user_id: i64, query: ReportQuery) -> Result<Vec<ReportRow>> {
        self.report_rows_impl(user_id, query).await
    }

    async fn dashboard_stats(
        &self,
        user_id: i64,
        recent_since: NaiveDate,
    ) -> Result<DashboardStats> {
        self.dashboard_stats_impl(user_id, recent_since).await
    }
}
