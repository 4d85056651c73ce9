use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};
use crate::models::groups::entities::SchoolClass;
use crate::models::schools::entities::{CreateSchoolRequest, LdapProvider, LdapSystem, School};
use crate::models::sync::entities::{LdapClass, LdapSchool, LdapUser, SyncMessage};
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::{CreateAccountRequest, CreateUserRequest, UpdateUserRequest};
use crate::services::users::admin::EMAIL_EXISTS;
use crate::storage::Storage;
use crate::utils::school_year::current_school_year;
use crate::utils::validate::same_email;

pub const USERNAME_EXISTS: &str = "Username already exists.";

/// 将队列中的同步消息写入数据库
pub struct SyncMessageProcessor {
    storage: Arc<dyn Storage>,
}

impl SyncMessageProcessor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn process(&self, message: &SyncMessage) -> Result<()> {
        match message {
            SyncMessage::SyncSchool { system_id, school } => {
                self.sync_school(*system_id, school).await?;
            }
            SyncMessage::SyncUser {
                system_id,
                school_ou,
                user,
            } => {
                self.sync_user(*system_id, school_ou, user).await?;
            }
            SyncMessage::SyncClass {
                system_id,
                school_ou,
                class,
            } => {
                self.sync_class(*system_id, school_ou, class).await?;
            }
        }
        Ok(())
    }

    async fn system(&self, system_id: i64) -> Result<LdapSystem> {
        self.storage
            .get_system_by_id(system_id)
            .await?
            .ok_or_else(|| SchulCloudError::not_found(format!("System {system_id} not found")))
    }

    async fn school(&self, system_id: i64, ldap_ou: &str) -> Result<School> {
        self.storage
            .get_school_by_ldap_identifier(system_id, ldap_ou)
            .await?
            .ok_or_else(|| SchulCloudError::not_found(format!("School {ldap_ou} not found")))
    }

    /// 按目录标识新建或更新学校
    pub async fn sync_school(&self, system_id: i64, data: &LdapSchool) -> Result<School> {
        let system = self.system(system_id).await?;

        if let Some(school) = self
            .storage
            .get_school_by_ldap_identifier(system_id, &data.ldap_ou)
            .await?
        {
            // 只有 Univention 提供可用的显示名
            if system.provider != LdapProvider::Univention || school.name == data.display_name {
                return Ok(school);
            }
            return self
                .storage
                .update_school_name(school.id, &data.display_name)
                .await?
                .ok_or_else(|| {
                    SchulCloudError::not_found(format!("School {} not found", school.id))
                });
        }

        let school = self
            .storage
            .create_school(CreateSchoolRequest {
                name: data.display_name.clone(),
                ldap_school_identifier: Some(data.ldap_ou.clone()),
                system_id: Some(system_id),
                current_year: Some(current_school_year()),
                federal_state: Some(AppConfig::get().ldap.default_federal_state.clone()),
                is_external: true,
            })
            .await?;
        info!(
            "Created school '{}' ({}) from system {}",
            school.name, data.ldap_ou, system_id
        );
        Ok(school)
    }

    /// 按 (ldap id, 学校) 新建或更新用户，保证每个用户都有已激活账户
    pub async fn sync_user(&self, system_id: i64, school_ou: &str, data: &LdapUser) -> Result<User> {
        let school = self.school(system_id, school_ou).await?;
        let username = directory_username(school_ou, &data.ldap_uid);

        if let Some(user) = self
            .storage
            .get_user_by_ldap_id(school.id, &data.ldap_id)
            .await?
        {
            let user = match user_changes(&user, data) {
                Some(update) => {
                    if update.email.is_some() {
                        self.ensure_email_free(&data.email, Some(user.id)).await?;
                    }
                    self.storage
                        .update_user(user.id, update)
                        .await?
                        .ok_or_else(|| {
                            SchulCloudError::not_found(format!("User {} not found", user.id))
                        })?
                }
                None => user,
            };
            self.sync_account(system_id, &user, &username).await?;
            return Ok(user);
        }

        self.ensure_email_free(&data.email, None).await?;
        self.ensure_username_free(&username, None).await?;

        let (user, _) = self
            .storage
            .create_user_with_account(
                CreateUserRequest {
                    school_id: school.id,
                    first_name: data.first_name.clone(),
                    last_name: data.last_name.clone(),
                    email: data.email.clone(),
                    role: data.role,
                    birthday: None,
                    import_hash: None,
                    ldap_dn: Some(data.ldap_dn.clone()),
                    ldap_id: Some(data.ldap_id.clone()),
                },
                directory_account(system_id, username),
            )
            .await?;

        debug!("Created user {} from {}", user.id, data.ldap_dn);
        Ok(user)
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<i64>) -> Result<()> {
        match self.storage.get_user_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(SchulCloudError::conflict(EMAIL_EXISTS))
            }
            _ => Ok(()),
        }
    }

    async fn ensure_username_free(&self, username: &str, owner: Option<i64>) -> Result<()> {
        match self.storage.get_account_by_username(username).await? {
            Some(existing) if Some(existing.user_id) != owner => {
                Err(SchulCloudError::conflict(USERNAME_EXISTS))
            }
            _ => Ok(()),
        }
    }

    /// 补建缺失的账户，或让用户名跟随目录中的 uid
    async fn sync_account(&self, system_id: i64, user: &User, username: &str) -> Result<()> {
        match self.storage.get_account_by_user_id(user.id).await? {
            Some(account) if account.username == username => {}
            Some(_) => {
                self.ensure_username_free(username, Some(user.id)).await?;
                self.storage.update_account_username(user.id, username).await?;
                debug!("Renamed account of user {} to {}", user.id, username);
            }
            None => {
                self.ensure_username_free(username, Some(user.id)).await?;
                let mut account = directory_account(system_id, username.to_string());
                account.user_id = user.id;
                self.storage.create_account(account).await?;
                info!("Created missing account for user {}", user.id);
            }
        }
        Ok(())
    }

    /// 按 (学年, DN) 新建或更新班级，并整体替换成员
    pub async fn sync_class(
        &self,
        system_id: i64,
        school_ou: &str,
        data: &LdapClass,
    ) -> Result<SchoolClass> {
        let school = self.school(system_id, school_ou).await?;
        let year = school.current_year.clone().unwrap_or_else(current_school_year);

        let class = match self
            .storage
            .get_class_by_ldap_dn(school.id, &year, &data.ldap_dn)
            .await?
        {
            Some(class) if class.name == data.name => class,
            Some(class) => self
                .storage
                .update_class_name(class.id, &data.name)
                .await?
                .ok_or_else(|| SchulCloudError::not_found(format!("Class {} not found", class.id)))?,
            None => {
                self.storage
                    .create_class(school.id, &data.name, Some(&data.ldap_dn), Some(&year))
                    .await?
            }
        };

        let members = self
            .storage
            .get_users_by_ldap_dns(school.id, &data.member_dns)
            .await?;
        let (students, teachers) = split_members(&members);
        self.storage
            .replace_class_members(class.id, &students, &teachers)
            .await?;

        debug!(
            "Class '{}' synced with {} students and {} teachers",
            class.name,
            students.len(),
            teachers.len()
        );
        Ok(class)
    }
}

/// 目录账户的用户名为 `{ou}/{uid}` 小写
fn directory_username(school_ou: &str, ldap_uid: &str) -> String {
    format!("{school_ou}/{ldap_uid}").to_lowercase()
}

fn directory_account(system_id: i64, username: String) -> CreateAccountRequest {
    CreateAccountRequest {
        user_id: 0,
        username,
        password_hash: None,
        system_id: Some(system_id),
        activated: true,
    }
}

/// 目录数据与本地用户的差异，无差异时返回 None
fn user_changes(user: &User, data: &LdapUser) -> Option<UpdateUserRequest> {
    let mut update = UpdateUserRequest::default();
    let mut changed = false;

    if user.first_name != data.first_name {
        update.first_name = Some(data.first_name.clone());
        changed = true;
    }
    if user.last_name != data.last_name {
        update.last_name = Some(data.last_name.clone());
        changed = true;
    }
    if !same_email(&user.email, &data.email) {
        update.email = Some(data.email.clone());
        changed = true;
    }
    if user.role != data.role {
        update.role = Some(data.role);
        changed = true;
    }
    if user.ldap_dn.as_deref() != Some(data.ldap_dn.as_str()) {
        update.ldap_dn = Some(data.ldap_dn.clone());
        changed = true;
    }

    changed.then_some(update)
}

fn split_members(members: &[User]) -> (Vec<i64>, Vec<i64>) {
    let mut students = Vec::new();
    let mut teachers = Vec::new();
    for user in members {
        match user.role {
            UserRole::Student => students.push(user.id),
            UserRole::Teacher | UserRole::Administrator => teachers.push(user.id),
            _ => {}
        }
    }
    (students, teachers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::{SeaOrmStorage, test_support::seed_system};

    fn ldap_user(uid: &str, role: UserRole) -> LdapUser {
        LdapUser {
            ldap_id: format!("uuid-{uid}"),
            ldap_dn: format!("uid={uid},cn=users,ou=gym1,dc=schule,dc=de"),
            ldap_uid: uid.to_string(),
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            email: format!("{uid}@gym1.de"),
            role,
        }
    }

    async fn setup() -> (Arc<dyn Storage>, SyncMessageProcessor, i64) {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let system = seed_system(&storage).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let processor = SyncMessageProcessor::new(storage.clone());
        (storage, processor, system.id)
    }

    #[tokio::test]
    async fn test_school_is_created_then_renamed() {
        let (_, processor, system_id) = setup().await;
        let mut data = LdapSchool {
            ldap_ou: "gym1".to_string(),
            display_name: "Gymnasium Eins".to_string(),
        };

        let created = processor.sync_school(system_id, &data).await.unwrap();
        assert!(created.is_external);
        assert_eq!(created.current_year, Some(current_school_year()));
        assert_eq!(
            created.federal_state.as_deref(),
            Some(AppConfig::get().ldap.default_federal_state.as_str())
        );

        data.display_name = "Gymnasium am See".to_string();
        let renamed = processor.sync_school(system_id, &data).await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "Gymnasium am See");
    }

    #[tokio::test]
    async fn test_user_upsert_creates_account_once() {
        let (storage, processor, system_id) = setup().await;
        let school = LdapSchool {
            ldap_ou: "gym1".to_string(),
            display_name: "Gymnasium".to_string(),
        };
        processor.sync_school(system_id, &school).await.unwrap();

        let mut data = ldap_user("Max", UserRole::Student);
        let created = processor.sync_user(system_id, "gym1", &data).await.unwrap();
        let account = storage
            .get_account_by_user_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.username, "gym1/max");
        assert!(account.activated);
        assert_eq!(account.system_id, Some(system_id));

        data.last_name = "Meier".to_string();
        let updated = processor.sync_user(system_id, "gym1", &data).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.last_name, "Meier");
    }

    async fn gym1(processor: &SyncMessageProcessor, system_id: i64) -> School {
        let school = LdapSchool {
            ldap_ou: "gym1".to_string(),
            display_name: "Gymnasium".to_string(),
        };
        processor.sync_school(system_id, &school).await.unwrap()
    }

    fn local_user(school_id: i64, email: &str, ldap_id: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            school_id,
            first_name: "Erika".to_string(),
            last_name: "Muster".to_string(),
            email: email.to_string(),
            role: UserRole::Student,
            birthday: None,
            import_hash: None,
            ldap_dn: None,
            ldap_id: ldap_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_taken_username_leaves_no_user_behind() {
        let (storage, processor, system_id) = setup().await;
        let school = gym1(&processor, system_id).await;
        let other = storage
            .create_user(local_user(school.id, "erika@gym1.de", None))
            .await
            .unwrap();
        storage
            .create_account(CreateAccountRequest {
                user_id: other.id,
                username: "gym1/max".to_string(),
                password_hash: None,
                system_id: None,
                activated: true,
            })
            .await
            .unwrap();

        let data = ldap_user("max", UserRole::Student);
        for _ in 0..2 {
            let err = processor.sync_user(system_id, "gym1", &data).await.unwrap_err();
            assert_eq!(err.message(), USERNAME_EXISTS);
            assert_eq!(err.status().as_u16(), 409);
        }
        assert!(storage.get_user_by_email(&data.email).await.unwrap().is_none());
        assert!(
            storage
                .get_user_by_ldap_id(school.id, &data.ldap_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_existing_user_without_account_gets_one() {
        let (storage, processor, system_id) = setup().await;
        let school = gym1(&processor, system_id).await;
        let data = ldap_user("max", UserRole::Student);
        let local = storage
            .create_user(local_user(school.id, &data.email, Some(&data.ldap_id)))
            .await
            .unwrap();

        let synced = processor.sync_user(system_id, "gym1", &data).await.unwrap();
        assert_eq!(synced.id, local.id);
        assert_eq!(synced.first_name, "Max");
        let account = storage
            .get_account_by_user_id(local.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.username, "gym1/max");
        assert_eq!(account.system_id, Some(system_id));
    }

    #[tokio::test]
    async fn test_email_change_to_taken_address_conflicts() {
        let (storage, processor, system_id) = setup().await;
        let school = gym1(&processor, system_id).await;
        let mut data = ldap_user("max", UserRole::Student);
        let created = processor.sync_user(system_id, "gym1", &data).await.unwrap();
        storage
            .create_user(local_user(school.id, "erika@gym1.de", None))
            .await
            .unwrap();

        data.email = "Erika@gym1.de".to_string();
        let err = processor.sync_user(system_id, "gym1", &data).await.unwrap_err();
        assert_eq!(err.message(), EMAIL_EXISTS);
        assert_eq!(err.status().as_u16(), 409);

        let unchanged = storage.get_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "max@gym1.de");
    }

    #[tokio::test]
    async fn test_uid_change_renames_account() {
        let (storage, processor, system_id) = setup().await;
        gym1(&processor, system_id).await;
        let mut data = ldap_user("max", UserRole::Student);
        let created = processor.sync_user(system_id, "gym1", &data).await.unwrap();

        data.ldap_uid = "M.Mustermann".to_string();
        data.email = "m.mustermann@gym1.de".to_string();
        let updated = processor.sync_user(system_id, "gym1", &data).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.email, "m.mustermann@gym1.de");

        let account = storage
            .get_account_by_user_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.username, "gym1/m.mustermann");
        assert!(storage.get_account_by_username("gym1/max").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_for_unknown_school_fails() {
        let (_, processor, system_id) = setup().await;
        let err = processor
            .sync_user(system_id, "nope", &ldap_user("max", UserRole::Student))
            .await
            .unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_class_members_follow_directory() {
        let (_, processor, system_id) = setup().await;
        let school = LdapSchool {
            ldap_ou: "gym1".to_string(),
            display_name: "Gymnasium".to_string(),
        };
        processor.sync_school(system_id, &school).await.unwrap();

        let student = ldap_user("anna", UserRole::Student);
        let teacher = ldap_user("lehrer", UserRole::Teacher);
        for user in [&student, &teacher] {
            processor.sync_user(system_id, "gym1", user).await.unwrap();
        }

        let mut class = LdapClass {
            ldap_dn: "cn=gym1-5a,cn=klassen".to_string(),
            name: "5a".to_string(),
            member_dns: vec![student.ldap_dn.clone(), teacher.ldap_dn.clone()],
        };
        let created = processor.sync_class(system_id, "gym1", &class).await.unwrap();
        assert_eq!(created.name_format, "static");

        class.name = "6a".to_string();
        let renamed = processor.sync_class(system_id, "gym1", &class).await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "6a");
    }

    #[test]
    fn test_split_members_ignores_other_roles() {
        let user = |id, role| User {
            id,
            school_id: 1,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role,
            birthday: None,
            import_hash: None,
            ldap_dn: None,
            ldap_id: None,
            deleted_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let members = [
            user(1, UserRole::Student),
            user(2, UserRole::Teacher),
            user(3, UserRole::Parent),
        ];
        assert_eq!(split_members(&members), (vec![1], vec![2]));
    }
}
