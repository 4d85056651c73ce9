use std::collections::HashMap;
use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（邮箱统一小写）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 在同一事务中创建用户及其账户，账户的 user_id 由新用户填充
    async fn create_user_with_account(
        &self,
        user: CreateUserRequest,
        account: CreateAccountRequest,
    ) -> Result<(User, Account)>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过导入哈希获取用户
    async fn get_user_by_import_hash(&self, import_hash: &str) -> Result<Option<User>>;
    // 通过 LDAP ID 获取学校内的用户
    async fn get_user_by_ldap_id(&self, school_id: i64, ldap_id: &str) -> Result<Option<User>>;
    // 通过 LDAP DN 批量获取学校内的用户
    async fn get_users_by_ldap_dns(&self, school_id: i64, dns: &[String]) -> Result<Vec<User>>;
    // 列出学校内符合条件的未删除用户
    async fn list_school_users(&self, filter: SchoolUserFilter) -> Result<Vec<User>>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;
    // 保存回收站记录
    async fn create_trashbin(&self, user_id: i64, data: serde_json::Value) -> Result<Trashbin>;
    // 以墓碑记录替换用户并清理其关联数据（单事务）
    async fn tombstone_user(&self, user_id: i64, references: &UserTaskReferences) -> Result<()>;

    /// 账户方法
    async fn create_account(&self, account: CreateAccountRequest) -> Result<Account>;
    async fn get_account_by_user_id(&self, user_id: i64) -> Result<Option<Account>>;
    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    // 修改用户名，返回是否有记录被更新
    async fn update_account_username(&self, user_id: i64, username: &str) -> Result<bool>;
    async fn update_last_login(&self, user_id: i64) -> Result<bool>;

    /// 同意书、家长与班级信息
    async fn get_consents_by_user_ids(&self, user_ids: &[i64]) -> Result<Vec<Consent>>;
    async fn get_user_parents(&self, user_id: i64) -> Result<Vec<UserParent>>;
    // 每个用户所在班级的名称
    async fn get_class_names_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>>;

    /// 注册方法
    async fn create_registration_pin(&self, email: &str, pin: &str) -> Result<RegistrationPin>;
    // 某邮箱最新的 PIN
    async fn get_latest_registration_pin(&self, email: &str) -> Result<Option<RegistrationPin>>;
    // 完成注册（单事务）
    async fn complete_registration(&self, record: RegistrationRecord)
    -> Result<RegistrationResponse>;

    /// 学校与外部系统
    async fn create_school(&self, school: CreateSchoolRequest) -> Result<School>;
    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>>;
    async fn get_school_by_ldap_identifier(
        &self,
        system_id: i64,
        identifier: &str,
    ) -> Result<Option<School>>;
    async fn update_school_name(&self, id: i64, name: &str) -> Result<Option<School>>;
    async fn list_school_ids(&self) -> Result<Vec<i64>>;
    async fn create_system(&self, system: CreateSystemRequest) -> Result<LdapSystem>;
    async fn get_system_by_id(&self, id: i64) -> Result<Option<LdapSystem>>;
    async fn update_system_sync_attempt(&self, id: i64, at: i64) -> Result<bool>;
    async fn update_system_successful_sync(&self, id: i64, at: i64) -> Result<bool>;

    /// 课程、团队与班级
    async fn create_course(&self, school_id: i64, name: &str, color: Option<&str>)
    -> Result<Course>;
    async fn add_course_member(&self, course_id: i64, user_id: i64, role: CourseRole)
    -> Result<()>;
    async fn get_course_memberships(&self, user_id: i64) -> Result<Vec<Membership<CourseRole>>>;
    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>>;
    // 各课程的学生人数
    async fn count_course_students(&self, course_ids: &[i64]) -> Result<HashMap<i64, i64>>;
    async fn create_team(&self, school_id: i64, name: &str) -> Result<Team>;
    async fn add_team_member(&self, team_id: i64, user_id: i64, role: TeamRole) -> Result<()>;
    async fn get_team_memberships(&self, user_id: i64) -> Result<Vec<Membership<TeamRole>>>;
    async fn get_class_by_ldap_dn(
        &self,
        school_id: i64,
        year: &str,
        ldap_dn: &str,
    ) -> Result<Option<SchoolClass>>;
    async fn create_class(
        &self,
        school_id: i64,
        name: &str,
        ldap_dn: Option<&str>,
        year: Option<&str>,
    ) -> Result<SchoolClass>;
    async fn update_class_name(&self, id: i64, name: &str) -> Result<Option<SchoolClass>>;
    // 整体替换班级成员（单事务）
    async fn replace_class_members(
        &self,
        class_id: i64,
        student_ids: &[i64],
        teacher_ids: &[i64],
    ) -> Result<()>;

    /// 新闻
    async fn create_news(&self, news: CreateNewsRecord) -> Result<News>;
    async fn get_news_by_id(&self, id: i64) -> Result<Option<News>>;
    // 按目标与发布状态分页查询，返回 (列表, 总数)
    async fn find_news(&self, query: NewsQuery) -> Result<(Vec<News>, u64)>;
    async fn update_news(&self, id: i64, update: UpdateNewsRecord) -> Result<Option<News>>;
    async fn delete_news(&self, id: i64) -> Result<bool>;

    /// 任务与提交
    async fn create_task(&self, task: CreateTaskRequest) -> Result<Task>;
    async fn create_submission(&self, submission: CreateSubmissionRequest) -> Result<Submission>;
    async fn archive_task(&self, task_id: i64, user_id: i64) -> Result<()>;
    // 未结束的任务，返回 (列表, 总数)
    async fn find_open_tasks(&self, query: OpenTaskQuery) -> Result<(Vec<Task>, u64)>;
    async fn get_submissions_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<Submission>>;
    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 删除用户前需要清理的任务引用
    async fn get_user_task_references(&self, user_id: i64) -> Result<UserTaskReferences>;

    /// 文件
    async fn create_file(&self, file: CreateFileRequest) -> Result<FileRecord>;
    async fn get_file_by_id(&self, id: i64) -> Result<Option<FileRecord>>;
    async fn list_files_by_owner(
        &self,
        owner_model: RefOwnerModel,
        owner_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<FileRecord>>;
    // 仅当当前锁等于 expected 时写入新锁
    async fn compare_and_set_file_lock(
        &self,
        id: i64,
        expected: Option<&str>,
        new_lock: Option<&str>,
    ) -> Result<bool>;
    // 内容写入后更新大小并递增版本
    async fn update_file_contents(&self, id: i64, size: i64) -> Result<Option<FileRecord>>;
    async fn rename_file(&self, id: i64, name: &str) -> Result<Option<FileRecord>>;
    async fn delete_file(&self, id: i64) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
