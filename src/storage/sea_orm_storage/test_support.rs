//! 测试用的数据构造

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::errors::{Result, SchulCloudError};
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
    schools::entities::{
        CreateSchoolRequest, CreateSystemRequest, LdapProvider, LdapSystem, School,
    },
    tasks::{
        entities::{Submission, Task, UserTaskReferences},
        requests::{CreateSubmissionRequest, CreateTaskRequest, OpenTaskQuery},
    },
    users::{
        entities::{Account, Consent, Trashbin, User, UserParent, UserRole},
        requests::{CreateAccountRequest, CreateUserRequest, SchoolUserFilter, UpdateUserRequest},
    },
};
use crate::storage::Storage;

pub(crate) async fn seed_system(storage: &SeaOrmStorage) -> LdapSystem {
    storage
        .create_system_impl(CreateSystemRequest {
            alias: "ucs".to_string(),
            provider: LdapProvider::Univention,
            url: "ldaps://ucs.schule.de".to_string(),
            root_path: "dc=schule,dc=de".to_string(),
            search_user: "uid=sync,cn=users,dc=schule,dc=de".to_string(),
            search_password: "secret".to_string(),
            import_url: Some("https://ucs.schule.de/api-import".to_string()),
            import_user: Some("import".to_string()),
            import_password: Some("secret".to_string()),
        })
        .await
        .unwrap()
}

pub(crate) async fn seed_school(storage: &SeaOrmStorage, name: &str) -> i64 {
    storage
        .create_school_impl(CreateSchoolRequest {
            name: name.to_string(),
            current_year: Some("2025/26".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

pub(crate) async fn seed_user(
    storage: &SeaOrmStorage,
    school_id: i64,
    email: &str,
    role: UserRole,
) -> User {
    storage
        .create_user_impl(CreateUserRequest {
            school_id,
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            email: email.to_string(),
            role,
            birthday: None,
            import_hash: None,
            ldap_dn: None,
            ldap_id: None,
        })
        .await
        .unwrap()
}

/// 带已激活账户的用户，用户名即邮箱
pub(crate) async fn seed_user_with_account(
    storage: &SeaOrmStorage,
    school_id: i64,
    email: &str,
    role: UserRole,
    password_hash: Option<String>,
) -> User {
    let user = seed_user(storage, school_id, email, role).await;
    storage
        .create_account_impl(CreateAccountRequest {
            user_id: user.id,
            username: email.to_string(),
            password_hash,
            system_id: None,
            activated: true,
        })
        .await
        .unwrap();
    user
}

/// 除 `update_user` 总是失败外，其余调用都转给内存数据库
pub(crate) struct FailingUserUpdates {
    pub inner: SeaOrmStorage,
}

#[async_trait::async_trait]
impl Storage for FailingUserUpdates {
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn create_user_with_account(&self, user: CreateUserRequest, account: CreateAccountRequest) -> Result<(User, Account)> {
        self.inner.create_user_with_account(user, account).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.inner.get_user_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.get_user_by_email(email).await
    }

    async fn get_user_by_import_hash(&self, import_hash: &str) -> Result<Option<User>> {
        self.inner.get_user_by_import_hash(import_hash).await
    }

    async fn get_user_by_ldap_id(&self, school_id: i64, ldap_id: &str) -> Result<Option<User>> {
        self.inner.get_user_by_ldap_id(school_id, ldap_id).await
    }

    async fn get_users_by_ldap_dns(&self, school_id: i64, dns: &[String]) -> Result<Vec<User>> {
        self.inner.get_users_by_ldap_dns(school_id, dns).await
    }

    async fn list_school_users(&self, filter: SchoolUserFilter) -> Result<Vec<User>> {
        self.inner.list_school_users(filter).await
    }

    async fn update_user(&self, _id: i64, _update: UpdateUserRequest) -> Result<Option<User>> {
        Err(SchulCloudError::database_operation("更新用户失败: 连接已断开"))
    }

    async fn count_users(&self) -> Result<u64> {
        self.inner.count_users().await
    }

    async fn create_trashbin(&self, user_id: i64, data: serde_json::Value) -> Result<Trashbin> {
        self.inner.create_trashbin(user_id, data).await
    }

    async fn tombstone_user(&self, user_id: i64, references: &UserTaskReferences) -> Result<()> {
        self.inner.tombstone_user(user_id, references).await
    }

    async fn create_account(&self, account: CreateAccountRequest) -> Result<Account> {
        self.inner.create_account(account).await
    }

    async fn get_account_by_user_id(&self, user_id: i64) -> Result<Option<Account>> {
        self.inner.get_account_by_user_id(user_id).await
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.inner.get_account_by_username(username).await
    }

    async fn update_account_username(&self, user_id: i64, username: &str) -> Result<bool> {
        self.inner.update_account_username(user_id, username).await
    }

    async fn update_last_login(&self, user_id: i64) -> Result<bool> {
        self.inner.update_last_login(user_id).await
    }

    async fn get_consents_by_user_ids(&self, user_ids: &[i64]) -> Result<Vec<Consent>> {
        self.inner.get_consents_by_user_ids(user_ids).await
    }

    async fn get_user_parents(&self, user_id: i64) -> Result<Vec<UserParent>> {
        self.inner.get_user_parents(user_id).await
    }

    async fn get_class_names_by_user_ids(&self, user_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>> {
        self.inner.get_class_names_by_user_ids(user_ids).await
    }

    async fn create_registration_pin(&self, email: &str, pin: &str) -> Result<RegistrationPin> {
        self.inner.create_registration_pin(email, pin).await
    }

    async fn get_latest_registration_pin(&self, email: &str) -> Result<Option<RegistrationPin>> {
        self.inner.get_latest_registration_pin(email).await
    }

    async fn complete_registration(&self, record: RegistrationRecord) -> Result<RegistrationResponse> {
        self.inner.complete_registration(record).await
    }

    async fn create_school(&self, school: CreateSchoolRequest) -> Result<School> {
        self.inner.create_school(school).await
    }

    async fn get_school_by_id(&self, id: i64) -> Result<Option<School>> {
        self.inner.get_school_by_id(id).await
    }

    async fn get_school_by_ldap_identifier(&self, system_id: i64, identifier: &str) -> Result<Option<School>> {
        self.inner.get_school_by_ldap_identifier(system_id, identifier).await
    }

    async fn update_school_name(&self, id: i64, name: &str) -> Result<Option<School>> {
        self.inner.update_school_name(id, name).await
    }

    async fn list_school_ids(&self) -> Result<Vec<i64>> {
        self.inner.list_school_ids().await
    }

    async fn create_system(&self, system: CreateSystemRequest) -> Result<LdapSystem> {
        self.inner.create_system(system).await
    }

    async fn get_system_by_id(&self, id: i64) -> Result<Option<LdapSystem>> {
        self.inner.get_system_by_id(id).await
    }

    async fn update_system_sync_attempt(&self, id: i64, at: i64) -> Result<bool> {
        self.inner.update_system_sync_attempt(id, at).await
    }

    async fn update_system_successful_sync(&self, id: i64, at: i64) -> Result<bool> {
        self.inner.update_system_successful_sync(id, at).await
    }

    async fn create_course(&self, school_id: i64, name: &str, color: Option<&str>) -> Result<Course> {
        self.inner.create_course(school_id, name, color).await
    }

    async fn add_course_member(&self, course_id: i64, user_id: i64, role: CourseRole) -> Result<()> {
        self.inner.add_course_member(course_id, user_id, role).await
    }

    async fn get_course_memberships(&self, user_id: i64) -> Result<Vec<Membership<CourseRole>>> {
        self.inner.get_course_memberships(user_id).await
    }

    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>> {
        self.inner.get_courses_by_ids(ids).await
    }

    async fn count_course_students(&self, course_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        self.inner.count_course_students(course_ids).await
    }

    async fn create_team(&self, school_id: i64, name: &str) -> Result<Team> {
        self.inner.create_team(school_id, name).await
    }

    async fn add_team_member(&self, team_id: i64, user_id: i64, role: TeamRole) -> Result<()> {
        self.inner.add_team_member(team_id, user_id, role).await
    }

    async fn get_team_memberships(&self, user_id: i64) -> Result<Vec<Membership<TeamRole>>> {
        self.inner.get_team_memberships(user_id).await
    }

    async fn get_class_by_ldap_dn(&self, school_id: i64, year: &str, ldap_dn: &str) -> Result<Option<SchoolClass>> {
        self.inner.get_class_by_ldap_dn(school_id, year, ldap_dn).await
    }

    async fn create_class(&self, school_id: i64, name: &str, ldap_dn: Option<&str>, year: Option<&str>) -> Result<SchoolClass> {
        self.inner.create_class(school_id, name, ldap_dn, year).await
    }

    async fn update_class_name(&self, id: i64, name: &str) -> Result<Option<SchoolClass>> {
        self.inner.update_class_name(id, name).await
    }

    async fn replace_class_members(&self, class_id: i64, student_ids: &[i64], teacher_ids: &[i64]) -> Result<()> {
        self.inner.replace_class_members(class_id, student_ids, teacher_ids).await
    }

    async fn create_news(&self, news: CreateNewsRecord) -> Result<News> {
        self.inner.create_news(news).await
    }

    async fn get_news_by_id(&self, id: i64) -> Result<Option<News>> {
        self.inner.get_news_by_id(id).await
    }

    async fn find_news(&self, query: NewsQuery) -> Result<(Vec<News>, u64)> {
        self.inner.find_news(query).await
    }

    async fn update_news(&self, id: i64, update: UpdateNewsRecord) -> Result<Option<News>> {
        self.inner.update_news(id, update).await
    }

    async fn delete_news(&self, id: i64) -> Result<bool> {
        self.inner.delete_news(id).await
    }

    async fn create_task(&self, task: CreateTaskRequest) -> Result<Task> {
        self.inner.create_task(task).await
    }

    async fn create_submission(&self, submission: CreateSubmissionRequest) -> Result<Submission> {
        self.inner.create_submission(submission).await
    }

    async fn archive_task(&self, task_id: i64, user_id: i64) -> Result<()> {
        self.inner.archive_task(task_id, user_id).await
    }

    async fn find_open_tasks(&self, query: OpenTaskQuery) -> Result<(Vec<Task>, u64)> {
        self.inner.find_open_tasks(query).await
    }

    async fn get_submissions_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<Submission>> {
        self.inner.get_submissions_by_task_ids(task_ids).await
    }

    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>> {
        self.inner.get_task_by_id(id).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.inner.get_submission_by_id(id).await
    }

    async fn get_user_task_references(&self, user_id: i64) -> Result<UserTaskReferences> {
        self.inner.get_user_task_references(user_id).await
    }

    async fn create_file(&self, file: CreateFileRequest) -> Result<FileRecord> {
        self.inner.create_file(file).await
    }

    async fn get_file_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        self.inner.get_file_by_id(id).await
    }

    async fn list_files_by_owner(&self, owner_model: RefOwnerModel, owner_id: i64, parent_id: Option<i64>) -> Result<Vec<FileRecord>> {
        self.inner.list_files_by_owner(owner_model, owner_id, parent_id).await
    }

    async fn compare_and_set_file_lock(&self, id: i64, expected: Option<&str>, new_lock: Option<&str>) -> Result<bool> {
        self.inner.compare_and_set_file_lock(id, expected, new_lock).await
    }

    async fn update_file_contents(&self, id: i64, size: i64) -> Result<Option<FileRecord>> {
        self.inner.update_file_contents(id, size).await
    }

    async fn rename_file(&self, id: i64, name: &str) -> Result<Option<FileRecord>> {
        self.inner.rename_file(id, name).await
    }

    async fn delete_file(&self, id: i64) -> Result<bool> {
        self.inner.delete_file(id).await
    }
}
