//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod files;
mod groups;
mod news;
mod registration;
mod schools;
mod tasks;
mod users;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::AppConfig;
use crate::errors::{SchulCloudError, Result};
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
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 内存 SQLite，仅用于测试
    #[cfg(test)]
    pub(crate) async fn new_in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // 内存库每个连接各自独立，必须只用一个连接
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;
        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchulCloudError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchulCloudError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| SchulCloudError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchulCloudError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use std::collections::HashMap;

use crate::models::{
    files::{
        entities::{FileRecord, RefOwnerModel},
        requests::CreateFileRequest,
    },
    groups::entities::{Course, CourseRole, Membership, SchoolClass, Team, TeamRole},
    news::{
        entities::News,
        requests::{CreateNewsRecord, NewsQuery, UpdateNewsRecord},
    },
    registration::{
        requests::RegistrationRecord,
        responses::{RegistrationPin, RegistrationResponse},
    },
    schools::entities::{CreateSchoolRequest, CreateSystemRequest, LdapSystem, School},
    tasks::{
        entities::{Submission, Task, UserTaskReferences},
        requests::{CreateSubmissionRequest, CreateTaskRequest, OpenTaskQuery},
    },
    users::{
        entities::{Account, Consent, Trashbin, User, UserParent},
        requests::{CreateAccountRequest, CreateUserRequest, SchoolUserFilter, UpdateUserRequest},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn create_user_with_account(
        &self,
        user: CreateUserRequest,
        account: CreateAccountRequest,
    ) -> Result<(User, Account)> {
        self.create_user_with_account_impl(user, account).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_import_hash(&self, import_hash: &str) -> Result<Option<User>> {
        self.get_user_by_import_hash_impl(import_hash).await
    }

    async fn get_user_by_ldap_id(&self, school_id: i64, ldap_id: &str) -> Result<Option<User>> {
        self.get_user_by_ldap_id_impl(school_id, ldap_id).await
    }

    async fn get_users_by_ldap_dns(&self, school_id: i64, dns: &[String]) -> Result<Vec<User>> {
        self.get_users_by_ldap_dns_impl(school_id, dns).await
    }

    async fn list_school_users(&self, filter: SchoolUserFilter) -> Result<Vec<User>> {
        self.list_school_users_impl(filter).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn create_trashbin(&self, user_id: i64, data: serde_json::Value) -> Result<Trashbin> {
        self.create_trashbin_impl(user_id, data).await
    }

    async fn tombstone_user(&self, user_id: i64, references: &UserTaskReferences) -> Result<()> {
        self.tombstone_user_impl(user_id, references).await
    }

    async fn create_account(&self, account: CreateAccountRequest) -> Result<Account> {
        self.create_account_impl(account).await
    }

    async fn get_account_by_user_id(&self, user_id: i64) -> Result<Option<Account>> {
        self.get_account_by_user_id_impl(user_id).await
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.get_account_by_username_impl(username).await
    }

    async fn update_account_username(&self, user_id: i64, username: &str) -> Result<bool> {
        self.update_account_username_impl(user_id, username).await
    }

    async fn update_last_login(&self, user_id: i64) -> Result<bool> {
        self.update_last_login_impl(user_id).await
    }

    async fn get_consents_by_user_ids(&self, user_ids: &[i64]) -> Result<Vec<Consent>> {
        self.get_consents_by_user_ids_impl(user_ids).await
    }

    async fn get_user_parents(&self, user_id: i64) -> Result<Vec<UserParent>> {
        self.get_user_parents_impl(user_id).await
    }

    async fn get_class_names_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>> {
        self.get_class_names_by_user_ids_impl(user_ids).await
    }

    // 注册模块
    async fn create_registration_pin(&self, email: &str, pin: &str) -> Result<RegistrationPin> {
        self.create_registration_pin_impl(email, pin).await
    }

    async fn get_latest_registration_pin(&self, email: &str) -> Result<Option<RegistrationPin>> {
        self.get_latest_registration_pin_impl(email).await
    }

    async fn complete_registration(
        &self,
        record: RegistrationRecord,
    ) -> Result<RegistrationResponse> {
        self.complete_registration_impl(record).await
    }

    // 学校模块
    async fn create_school(&self, school: CreateSchoolRequest) -> Result<School> {
        self.create_school_impl(school).await
    }

    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>> {
        self.get_school_by_id_impl(id).await
    }

    async fn get_school_by_ldap_identifier(
        &self,
        system_id: i64,
        identifier: &str,
    ) -> Result<Option<School>> {
        self.get_school_by_ldap_identifier_impl(system_id, identifier)
            .await
    }

    async fn update_school_name(&self, id: i64, name: &str) -> Result<Option<School>> {
        self.update_school_name_impl(id, name).await
    }

    async fn list_school_ids(&self) -> Result<Vec<i64>> {
        self.list_school_ids_impl().await
    }

    async fn create_system(&self, system: CreateSystemRequest) -> Result<LdapSystem> {
        self.create_system_impl(system).await
    }

    async fn get_system_by_id(&self, id: i64) -> Result<Option<LdapSystem>> {
        self.get_system_by_id_impl(id).await
    }

    async fn update_system_sync_attempt(&self, id: i64, at: i64) -> Result<bool> {
        self.update_system_sync_attempt_impl(id, at).await
    }

    async fn update_system_successful_sync(&self, id: i64, at: i64) -> Result<bool> {
        self.update_system_successful_sync_impl(id, at).await
    }

    // 课程、团队与班级模块
    async fn create_course(
        &self,
        school_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> Result<Course> {
        self.create_course_impl(school_id, name, color).await
    }

    async fn add_course_member(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<()> {
        self.add_course_member_impl(course_id, user_id, role).await
    }

    async fn get_course_memberships(&self, user_id: i64) -> Result<Vec<Membership<CourseRole>>> {
        self.get_course_memberships_impl(user_id).await
    }

    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>> {
        self.get_courses_by_ids_impl(ids).await
    }

    async fn count_course_students(&self, course_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        self.count_course_students_impl(course_ids).await
    }

    async fn create_team(&self, school_id: i64, name: &str) -> Result<Team> {
        self.create_team_impl(school_id, name).await
    }

    async fn add_team_member(&self, team_id: i64, user_id: i64, role: TeamRole) -> Result<()> {
        self.add_team_member_impl(team_id, user_id, role).await
    }

    async fn get_team_memberships(&self, user_id: i64) -> Result<Vec<Membership<TeamRole>>> {
        self.get_team_memberships_impl(user_id).await
    }

    async fn get_class_by_ldap_dn(
        &self,
        school_id: i64,
        year: &str,
        ldap_dn: &str,
    ) -> Result<Option<SchoolClass>> {
        self.get_class_by_ldap_dn_impl(school_id, year, ldap_dn)
            .await
    }

    async fn create_class(
        &self,
        school_id: i64,
        name: &str,
        ldap_dn: Option<&str>,
        year: Option<&str>,
    ) -> Result<SchoolClass> {
        self.create_class_impl(school_id, name, ldap_dn, year).await
    }

    async fn update_class_name(&self, id: i64, name: &str) -> Result<Option<SchoolClass>> {
        self.update_class_name_impl(id, name).await
    }

    async fn replace_class_members(
        &self,
        class_id: i64,
        student_ids: &[i64],
        teacher_ids: &[i64],
    ) -> Result<()> {
        self.replace_class_members_impl(class_id, student_ids, teacher_ids)
            .await
    }

    // 新闻模块
    async fn create_news(&self, news: CreateNewsRecord) -> Result<News> {
        self.create_news_impl(news).await
    }

    async fn get_news_by_id(&self, id: i64) -> Result<Option<News>> {
        self.get_news_by_id_impl(id).await
    }

    async fn find_news(&self, query: NewsQuery) -> Result<(Vec<News>, u64)> {
        self.find_news_impl(query).await
    }

    async fn update_news(&self, id: i64, update: UpdateNewsRecord) -> Result<Option<News>> {
        self.update_news_impl(id, update).await
    }

    async fn delete_news(&self, id: i64) -> Result<bool> {
        self.delete_news_impl(id).await
    }

    // 任务模块
    async fn create_task(&self, task: CreateTaskRequest) -> Result<Task> {
        self.create_task_impl(task).await
    }

    async fn create_submission(&self, submission: CreateSubmissionRequest) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn archive_task(&self, task_id: i64, user_id: i64) -> Result<()> {
        self.archive_task_impl(task_id, user_id).await
    }

    async fn find_open_tasks(&self, query: OpenTaskQuery) -> Result<(Vec<Task>, u64)> {
        self.find_open_tasks_impl(query).await
    }

    async fn get_submissions_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<Submission>> {
        self.get_submissions_by_task_ids_impl(task_ids).await
    }

    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>> {
        self.get_task_by_id_impl(id).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_user_task_references(&self, user_id: i64) -> Result<UserTaskReferences> {
        self.get_user_task_references_impl(user_id).await
    }

    // 文件模块
    async fn create_file(&self, file: CreateFileRequest) -> Result<FileRecord> {
        self.create_file_impl(file).await
    }

    async fn get_file_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        self.get_file_by_id_impl(id).await
    }

    async fn list_files_by_owner(
        &self,
        owner_model: RefOwnerModel,
        owner_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<FileRecord>> {
        self.list_files_by_owner_impl(owner_model, owner_id, parent_id)
            .await
    }

    async fn compare_and_set_file_lock(
        &self,
        id: i64,
        expected: Option<&str>,
        new_lock: Option<&str>,
    ) -> Result<bool> {
        self.compare_and_set_file_lock_impl(id, expected, new_lock)
            .await
    }

    async fn update_file_contents(&self, id: i64, size: i64) -> Result<Option<FileRecord>> {
        self.update_file_contents_impl(id, size).await
    }

    async fn rename_file(&self, id: i64, name: &str) -> Result<Option<FileRecord>> {
        self.rename_file_impl(id, name).await
    }

    async fn delete_file(&self, id: i64) -> Result<bool> {
        self.delete_file_impl(id).await
    }
}
