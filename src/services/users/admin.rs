//! 学校管理员维护学生与教师
//!
//! 学生与教师共用同一套逻辑，仅角色与所需权限不同。

use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::PaginatedResponse;
use crate::models::auth::permissions::Permission;
use crate::models::users::{
    entities::{ConsentStatus, User, UserRole},
    requests::{AdminUserListParams, AdminUserPatch, AdminUserRequest, CreateUserRequest,
        SchoolUserFilter, UpdateUserRequest},
    responses::{AdminUserItem, BulkDeleteResponse, DeleteUserResponse},
};
use crate::storage::Storage;
use crate::utils::validate::{normalize_email, validate_email};

use super::delete::delete_user;

pub const EXTERNAL_SCHOOL: &str =
    "Creating new students or teachers is only possible in the source system.";
pub const EMAIL_EXISTS: &str = "Email already exists.";

/// 管理对象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminUserKind {
    Students,
    Teachers,
}

impl AdminUserKind {
    pub fn role(&self) -> UserRole {
        match self {
            AdminUserKind::Students => UserRole::Student,
            AdminUserKind::Teachers => UserRole::Teacher,
        }
    }

    pub fn list_permission(&self) -> Permission {
        match self {
            AdminUserKind::Students => Permission::StudentList,
            AdminUserKind::Teachers => Permission::TeacherList,
        }
    }

    pub fn create_permission(&self) -> Permission {
        match self {
            AdminUserKind::Students => Permission::StudentCreate,
            AdminUserKind::Teachers => Permission::TeacherCreate,
        }
    }

    pub fn edit_permission(&self) -> Permission {
        match self {
            AdminUserKind::Students => Permission::StudentEdit,
            AdminUserKind::Teachers => Permission::TeacherEdit,
        }
    }

    pub fn delete_permission(&self) -> Permission {
        match self {
            AdminUserKind::Students => Permission::StudentDelete,
            AdminUserKind::Teachers => Permission::TeacherDelete,
        }
    }
}

impl std::str::FromStr for AdminUserKind {
    type Err = SchulCloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "students" => Ok(AdminUserKind::Students),
            "teachers" => Ok(AdminUserKind::Teachers),
            other => Err(SchulCloudError::not_found(format!("Unknown user kind: {other}"))),
        }
    }
}

/// 逗号分隔的 ID 列表
pub(crate) fn parse_id_list(raw: Option<&str>) -> Result<Vec<i64>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| SchulCloudError::bad_request(format!("Invalid id: {s}")))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    FirstName,
    LastName,
    Email,
    CreatedAt,
    ConsentStatus,
    Classes,
}

impl SortField {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.unwrap_or("first_name") {
            "first_name" | "firstName" => Ok(SortField::FirstName),
            "last_name" | "lastName" => Ok(SortField::LastName),
            "email" => Ok(SortField::Email),
            "created_at" | "createdAt" => Ok(SortField::CreatedAt),
            "consent_status" | "consentStatus" => Ok(SortField::ConsentStatus),
            "classes" => Ok(SortField::Classes),
            other => Err(SchulCloudError::bad_request(format!("Invalid sort field: {other}"))),
        }
    }

    fn compare(&self, a: &AdminUserItem, b: &AdminUserItem) -> Ordering {
        match self {
            SortField::FirstName => a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()),
            SortField::LastName => a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()),
            SortField::Email => a.email.cmp(&b.email),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::ConsentStatus => a.consent_status.cmp(&b.consent_status),
            SortField::Classes => a.classes.join(",").cmp(&b.classes.join(",")),
        }
    }
}

async fn load_items(storage: &Arc<dyn Storage>, users: Vec<User>) -> Result<Vec<AdminUserItem>> {
    let ids = users.iter().map(|u| u.id).collect::<Vec<_>>();
    let consents = storage.get_consents_by_user_ids(&ids).await?;
    let mut class_names = storage.get_class_names_by_user_ids(&ids).await?;

    Ok(users
        .into_iter()
        .map(|user| {
            let status = ConsentStatus::of(consents.iter().find(|c| c.user_id == user.id));
            let classes = class_names.remove(&user.id).unwrap_or_default();
            AdminUserItem::new(user, status, classes)
        })
        .collect())
}

pub async fn list(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    params: AdminUserListParams,
) -> Result<PaginatedResponse<AdminUserItem>> {
    let (page, size) = params.pagination().normalized();
    let sort = SortField::parse(params.sort_by.as_deref())?;
    let descending = params.sort_order.as_deref() == Some("desc");
    let consent_filter = params
        .consent_status
        .as_deref()
        .map(str::parse::<ConsentStatus>)
        .transpose()
        .map_err(SchulCloudError::bad_request)?;

    let filter = SchoolUserFilter {
        school_id: admin.school_id,
        role: Some(kind.role()),
        first_name: params.first_name.clone(),
        last_name: params.last_name.clone(),
        class_ids: parse_id_list(params.classes.as_deref())?,
        user_ids: parse_id_list(params.users.as_deref())?,
        created_after: params.created_after.map(|d| d.timestamp()),
        created_before: params.created_before.map(|d| d.timestamp()),
    };

    let users = storage.list_school_users(filter).await?;
    let mut items = load_items(storage, users).await?;

    if let Some(status) = consent_filter {
        items.retain(|item| item.consent_status == status);
    }

    items.sort_by(|a, b| {
        let ordering = sort.compare(a, b).then(a.id.cmp(&b.id));
        if descending { ordering.reverse() } else { ordering }
    });

    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(size) as usize)
        .take(size as usize)
        .collect();

    Ok(PaginatedResponse::new(items, page, size, total))
}

/// 取管理员学校内指定角色的未删除用户
async fn find_user(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    id: i64,
) -> Result<User> {
    storage
        .get_user_by_id(id)
        .await?
        .filter(|u| !u.is_deleted() && u.role == kind.role())
        .filter(|u| u.school_id == admin.school_id || admin.role.is_superhero())
        .ok_or_else(|| SchulCloudError::not_found(format!("User {id} not found")))
}

pub async fn find(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    id: i64,
) -> Result<AdminUserItem> {
    let user = find_user(storage, admin, kind, id).await?;
    let mut items = load_items(storage, vec![user]).await?;
    items
        .pop()
        .ok_or_else(|| SchulCloudError::not_found(format!("User {id} not found")))
}

async fn ensure_internal_school(storage: &Arc<dyn Storage>, school_id: i64) -> Result<()> {
    let school = storage
        .get_school_by_id(school_id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("School {school_id} not found")))?;
    if school.is_external {
        return Err(SchulCloudError::authorization(EXTERNAL_SCHOOL));
    }
    Ok(())
}

/// 检查邮箱格式与唯一性，`owner` 自身的邮箱不算重复
async fn ensure_email_available(
    storage: &Arc<dyn Storage>,
    email: &str,
    owner: Option<i64>,
) -> Result<String> {
    let email = normalize_email(email);
    validate_email(&email).map_err(SchulCloudError::validation)?;
    if let Some(existing) = storage.get_user_by_email(&email).await?
        && Some(existing.id) != owner
    {
        return Err(SchulCloudError::bad_request(EMAIL_EXISTS));
    }
    Ok(email)
}

pub async fn create(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    req: AdminUserRequest,
) -> Result<User> {
    ensure_internal_school(storage, admin.school_id).await?;
    let email = ensure_email_available(storage, &req.email, None).await?;

    let user = storage
        .create_user(CreateUserRequest {
            school_id: admin.school_id,
            first_name: req.first_name,
            last_name: req.last_name,
            email,
            role: kind.role(),
            birthday: req.birthday,
            import_hash: None,
            ldap_dn: None,
            ldap_id: None,
        })
        .await?;

    tracing::info!("{} {} created by {}", kind.role(), user.id, admin.id);
    Ok(user)
}

/// PUT 与 PATCH 共用，账户用户名随邮箱变化
pub async fn update(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    id: i64,
    patch: AdminUserPatch,
) -> Result<User> {
    ensure_internal_school(storage, admin.school_id).await?;
    let user = find_user(storage, admin, kind, id).await?;

    let email = match patch.email.as_deref() {
        Some(email) => Some(ensure_email_available(storage, email, Some(user.id)).await?),
        None => None,
    };

    let account = storage.get_account_by_user_id(user.id).await?;
    let renamed = match (&email, &account) {
        (Some(email), Some(account)) if *email != account.username => {
            storage.update_account_username(user.id, email).await?
        }
        _ => false,
    };

    let update = UpdateUserRequest {
        first_name: patch.first_name,
        last_name: patch.last_name,
        email,
        birthday: patch.birthday,
        ..Default::default()
    };

    match storage.update_user(user.id, update).await {
        Ok(Some(updated)) => Ok(updated),
        result => {
            // 用户写入失败时恢复原用户名
            if renamed && let Some(account) = account {
                storage
                    .update_account_username(user.id, &account.username)
                    .await?;
            }
            match result {
                Ok(_) => Err(SchulCloudError::not_found(format!("User {id} not found"))),
                Err(e) => Err(e),
            }
        }
    }
}

pub async fn replace(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    id: i64,
    req: AdminUserRequest,
) -> Result<User> {
    update(storage, admin, kind, id, req.into()).await
}

pub async fn remove(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    id: i64,
) -> Result<DeleteUserResponse> {
    find_user(storage, admin, kind, id).await?;
    delete_user(storage, admin, id).await
}

pub async fn remove_many(
    storage: &Arc<dyn Storage>,
    admin: &User,
    kind: AdminUserKind,
    ids: &str,
) -> Result<BulkDeleteResponse> {
    let ids = parse_id_list(Some(ids))?;
    if ids.is_empty() {
        return Err(SchulCloudError::bad_request("No user ids given"));
    }

    let mut deleted = Vec::with_capacity(ids.len());
    for id in ids {
        deleted.push(remove(storage, admin, kind, id).await?);
    }
    Ok(BulkDeleteResponse { deleted })
}
