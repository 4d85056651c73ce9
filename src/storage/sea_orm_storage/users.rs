use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{
    accounts, class_users, classes, consents, submission_files, submission_members, submissions,
    task_archives, tasks, trashbins, user_parents, users,
};
use crate::errors::{Result, SchulCloudError};
use crate::models::{
    tasks::entities::UserTaskReferences,
    users::{
        entities::{Account, Consent, Trashbin, User, UserParent},
        requests::{CreateAccountRequest, CreateUserRequest, SchoolUserFilter, UpdateUserRequest},
    },
};
use crate::utils::{contains_pattern, validate::normalize_email};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

pub(crate) const TOMBSTONE_FIRST_NAME: &str = "DELETED";
pub(crate) const TOMBSTONE_LAST_NAME: &str = "USER";

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = UserActiveModel {
            school_id: Set(req.school_id),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            email: Set(normalize_email(&req.email)),
            role: Set(req.role.to_string()),
            birthday: Set(req.birthday.map(|b| b.timestamp())),
            import_hash: Set(req.import_hash),
            ldap_dn: Set(req.ldap_dn),
            ldap_id: Set(req.ldap_id),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 用户与账户一并写入，任一失败则整体回滚
    pub async fn create_user_with_account_impl(
        &self,
        req: CreateUserRequest,
        account: CreateAccountRequest,
    ) -> Result<(User, Account)> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let user = UserActiveModel {
            school_id: Set(req.school_id),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            email: Set(normalize_email(&req.email)),
            role: Set(req.role.to_string()),
            birthday: Set(req.birthday.map(|b| b.timestamp())),
            import_hash: Set(req.import_hash),
            ldap_dn: Set(req.ldap_dn),
            ldap_id: Set(req.ldap_id),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| SchulCloudError::database_operation(format!("创建用户失败: {e}")))?;

        let account = AccountActiveModel {
            user_id: Set(user.id),
            username: Set(account.username.trim().to_lowercase()),
            password_hash: Set(account.password_hash),
            system_id: Set(account.system_id),
            activated: Set(account.activated),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| SchulCloudError::database_operation(format!("创建账户失败: {e}")))?;

        txn.commit().await?;
        Ok((user.into_user(), account.into_account()))
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户（忽略大小写）
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_import_hash_impl(&self, import_hash: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(users::Column::ImportHash.eq(import_hash))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_ldap_id_impl(
        &self,
        school_id: i64,
        ldap_id: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(users::Column::SchoolId.eq(school_id))
            .filter(users::Column::LdapId.eq(ldap_id))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_users_by_ldap_dns_impl(
        &self,
        school_id: i64,
        dns: &[String],
    ) -> Result<Vec<User>> {
        if dns.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(users::Column::SchoolId.eq(school_id))
            .filter(users::Column::LdapDn.is_in(dns.iter().cloned()))
            .filter(users::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 学校用户列表，排序与分页由调用方完成
    pub async fn list_school_users_impl(&self, filter: SchoolUserFilter) -> Result<Vec<User>> {
        let mut select = Users::find()
            .filter(users::Column::SchoolId.eq(filter.school_id))
            .filter(users::Column::DeletedAt.is_null());

        if let Some(role) = filter.role {
            select = select.filter(users::Column::Role.eq(role.to_string()));
        }

        if let Some(ref first_name) = filter.first_name
            && !first_name.trim().is_empty()
        {
            select = select.filter(users::Column::FirstName.like(contains_pattern(first_name.trim())));
        }

        if let Some(ref last_name) = filter.last_name
            && !last_name.trim().is_empty()
        {
            select = select.filter(users::Column::LastName.like(contains_pattern(last_name.trim())));
        }

        if !filter.user_ids.is_empty() {
            select = select.filter(users::Column::Id.is_in(filter.user_ids.clone()));
        }

        if !filter.class_ids.is_empty() {
            let members = Query::select()
                .column(class_users::Column::UserId)
                .from(ClassUsers)
                .and_where(class_users::Column::ClassId.is_in(filter.class_ids.clone()))
                .to_owned();
            select = select.filter(users::Column::Id.in_subquery(members));
        }

        if let Some(after) = filter.created_after {
            select = select.filter(users::Column::CreatedAt.gte(after));
        }

        if let Some(before) = filter.created_before {
            select = select.filter(users::Column::CreatedAt.lte(before));
        }

        let result = select
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 更新用户信息
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询用户失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(email) = update.email {
            model.email = Set(normalize_email(&email));
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(birthday) = update.birthday {
            model.birthday = Set(Some(birthday.timestamp()));
        }
        if let Some(ldap_dn) = update.ldap_dn {
            model.ldap_dn = Set(Some(ldap_dn));
        }
        if let Some(import_hash) = update.import_hash {
            model.import_hash = Set(import_hash);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新用户失败: {e}")))?;

        Ok(Some(result.into_user()))
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("统计用户失败: {e}")))
    }

    pub async fn create_trashbin_impl(
        &self,
        user_id: i64,
        data: serde_json::Value,
    ) -> Result<Trashbin> {
        let model = TrashbinActiveModel {
            user_id: Set(user_id),
            data: Set(serde_json::to_string(&data)?),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("写入回收站失败: {e}")))?;

        Ok(result.into_trashbin())
    }

    /// 以墓碑记录替换用户并清理关联数据
    pub async fn tombstone_user_impl(
        &self,
        user_id: i64,
        references: &UserTaskReferences,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let Some(existing) = Users::find_by_id(user_id).one(&txn).await? else {
            return Err(SchulCloudError::not_found(format!("User {user_id} not found")));
        };

        let mut user = existing.into_active_model();
        user.first_name = Set(TOMBSTONE_FIRST_NAME.to_string());
        user.last_name = Set(TOMBSTONE_LAST_NAME.to_string());
        user.email = Set(format!("{}@deleted", uuid::Uuid::new_v4()));
        user.birthday = Set(None);
        user.import_hash = Set(None);
        user.ldap_dn = Set(None);
        user.ldap_id = Set(None);
        user.deleted_at = Set(Some(now));
        user.updated_at = Set(now);
        user.update(&txn).await?;

        Accounts::delete_many()
            .filter(accounts::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        Consents::delete_many()
            .filter(consents::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        UserParents::delete_many()
            .filter(user_parents::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        // 私有任务及其提交
        if !references.private_task_ids.is_empty() {
            let task_ids = references.private_task_ids.clone();
            let submission_ids: Vec<i64> = Submissions::find()
                .filter(submissions::Column::TaskId.is_in(task_ids.clone()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();
            delete_submissions(&txn, &submission_ids).await?;
            Tasks::delete_many()
                .filter(tasks::Column::Id.is_in(task_ids))
                .exec(&txn)
                .await?;
        }

        delete_submissions(&txn, &references.single_submission_ids).await?;

        if !references.group_submission_ids.is_empty() {
            SubmissionMembers::delete_many()
                .filter(submission_members::Column::UserId.eq(user_id))
                .filter(
                    submission_members::Column::SubmissionId
                        .is_in(references.group_submission_ids.clone()),
                )
                .exec(&txn)
                .await?;
        }

        TaskArchives::delete_many()
            .filter(task_archives::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// 创建账户
    pub async fn create_account_impl(&self, req: CreateAccountRequest) -> Result<Account> {
        let now = chrono::Utc::now().timestamp();

        let model = AccountActiveModel {
            user_id: Set(req.user_id),
            username: Set(req.username.trim().to_lowercase()),
            password_hash: Set(req.password_hash),
            system_id: Set(req.system_id),
            activated: Set(req.activated),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建账户失败: {e}")))?;

        Ok(result.into_account())
    }

    pub async fn get_account_by_user_id_impl(&self, user_id: i64) -> Result<Option<Account>> {
        let result = Accounts::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询账户失败: {e}")))?;

        Ok(result.map(|m| m.into_account()))
    }

    pub async fn get_account_by_username_impl(&self, username: &str) -> Result<Option<Account>> {
        let result = Accounts::find()
            .filter(accounts::Column::Username.eq(username.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询账户失败: {e}")))?;

        Ok(result.map(|m| m.into_account()))
    }

    pub async fn update_account_username_impl(&self, user_id: i64, username: &str) -> Result<bool> {
        let result = Accounts::update_many()
            .col_expr(
                accounts::Column::Username,
                Expr::value(username.trim().to_lowercase()),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(accounts::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新用户名失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新最后登录时间
    pub async fn update_last_login_impl(&self, user_id: i64) -> Result<bool> {
        let result = Accounts::update_many()
            .col_expr(
                accounts::Column::LastLogin,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(accounts::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_consents_by_user_ids_impl(&self, user_ids: &[i64]) -> Result<Vec<Consent>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Consents::find()
            .filter(consents::Column::UserId.is_in(user_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询同意书失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_consent()).collect())
    }

    pub async fn get_user_parents_impl(&self, user_id: i64) -> Result<Vec<UserParent>> {
        let result = UserParents::find()
            .filter(user_parents::Column::UserId.eq(user_id))
            .order_by_asc(user_parents::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询家长失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user_parent()).collect())
    }

    pub async fn get_class_names_by_user_ids_impl(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ClassUsers::find()
            .filter(class_users::Column::UserId.is_in(user_ids.to_vec()))
            .find_also_related(Classes)
            .order_by_asc(classes::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询班级失败: {e}")))?;

        let mut names: HashMap<i64, Vec<String>> = HashMap::new();
        for (member, class) in rows {
            if let Some(class) = class {
                names.entry(member.user_id).or_default().push(class.name);
            }
        }
        Ok(names)
    }
}

/// 删除提交及其成员与附件记录
async fn delete_submissions<C>(conn: &C, submission_ids: &[i64]) -> Result<()>
where
    C: sea_orm::ConnectionTrait,
{
    if submission_ids.is_empty() {
        return Ok(());
    }

    let ids = submission_ids.to_vec();
    SubmissionMembers::delete_many()
        .filter(submission_members::Column::SubmissionId.is_in(ids.clone()))
        .exec(conn)
        .await?;
    SubmissionFiles::delete_many()
        .filter(submission_files::Column::SubmissionId.is_in(ids.clone()))
        .exec(conn)
        .await?;
    Submissions::delete_many()
        .filter(submissions::Column::Id.is_in(ids))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tasks::requests::{CreateSubmissionRequest, CreateTaskRequest};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user_with_account};

    async fn storage_with_school() -> (SeaOrmStorage, i64) {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Schiller-Oberschule").await;
        (storage, school_id)
    }

    fn new_user(school_id: i64, email: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            school_id,
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            email: email.to_string(),
            role,
            birthday: None,
            import_hash: None,
            ldap_dn: None,
            ldap_id: None,
        }
    }

    #[tokio::test]
    async fn test_user_with_account_rolls_back_on_taken_username() {
        let (storage, school_id) = storage_with_school().await;
        seed_user_with_account(&storage, school_id, "gym1/max", UserRole::Student, None).await;

        let err = storage
            .create_user_with_account_impl(
                new_user(school_id, "max@gym1.de", UserRole::Student),
                CreateAccountRequest {
                    user_id: 0,
                    username: "GYM1/Max".to_string(),
                    password_hash: None,
                    system_id: None,
                    activated: true,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 500);
        assert!(storage.get_user_by_email_impl("max@gym1.de").await.unwrap().is_none());

        let (user, account) = storage
            .create_user_with_account_impl(
                new_user(school_id, "max@gym1.de", UserRole::Student),
                CreateAccountRequest {
                    user_id: 0,
                    username: "gym1/max2".to_string(),
                    password_hash: None,
                    system_id: None,
                    activated: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(account.user_id, user.id);
    }

    #[tokio::test]
    async fn test_email_is_stored_lower_case() {
        let (storage, school_id) = storage_with_school().await;
        let user = storage
            .create_user_impl(new_user(school_id, "Max@Mustermann.DE", UserRole::Student))
            .await
            .unwrap();

        assert_eq!(user.email, "max@mustermann.de");
        let found = storage
            .get_user_by_email_impl("MAX@mustermann.de")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_list_school_users_filters_by_role_and_name() {
        let (storage, school_id) = storage_with_school().await;
        storage
            .create_user_impl(new_user(school_id, "a@schule.de", UserRole::Student))
            .await
            .unwrap();
        let mut teacher = new_user(school_id, "b@schule.de", UserRole::Teacher);
        teacher.first_name = "Erika".to_string();
        storage.create_user_impl(teacher).await.unwrap();

        let students = storage
            .list_school_users_impl(SchoolUserFilter {
                school_id,
                role: Some(UserRole::Student),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(students.len(), 1);

        let eri = storage
            .list_school_users_impl(SchoolUserFilter {
                school_id,
                first_name: Some("rik".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(eri.len(), 1);
        assert_eq!(eri[0].first_name, "Erika");
    }

    #[tokio::test]
    async fn test_tombstone_user_clears_personal_data() {
        let (storage, school_id) = storage_with_school().await;
        let user =
            seed_user_with_account(&storage, school_id, "max@schule.de", UserRole::Teacher, None)
                .await;

        let now = chrono::Utc::now();
        let private_task = storage
            .create_task_impl(CreateTaskRequest {
                school_id,
                course_id: None,
                teacher_id: user.id,
                name: "Entwurf".to_string(),
                description: None,
                private: true,
                available_at: now,
                due_at: None,
            })
            .await
            .unwrap();
        let public_task = storage
            .create_task_impl(CreateTaskRequest {
                school_id,
                course_id: None,
                teacher_id: user.id,
                name: "Aufsatz".to_string(),
                description: None,
                private: false,
                available_at: now,
                due_at: None,
            })
            .await
            .unwrap();
        storage
            .create_submission_impl(CreateSubmissionRequest {
                task_id: private_task.id,
                school_id,
                student_id: user.id,
                ..Default::default()
            })
            .await
            .unwrap();

        let references = storage.get_user_task_references_impl(user.id).await.unwrap();
        assert_eq!(references.private_task_ids, vec![private_task.id]);
        assert_eq!(references.public_task_ids, vec![public_task.id]);

        storage
            .tombstone_user_impl(user.id, &references)
            .await
            .unwrap();

        let tombstone = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert_eq!(tombstone.first_name, TOMBSTONE_FIRST_NAME);
        assert_eq!(tombstone.last_name, TOMBSTONE_LAST_NAME);
        assert!(tombstone.email.ends_with("@deleted"));
        assert!(tombstone.is_deleted());
        assert!(
            storage
                .get_account_by_user_id_impl(user.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .get_task_by_id_impl(private_task.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .get_task_by_id_impl(public_task.id)
                .await
                .unwrap()
                .is_some()
        );
    }
}
