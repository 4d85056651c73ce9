//! 文件访问判定
//!
//! 个人文件的所有者拥有全部权限；其余情况先看针对用户的条目，再看针对角色的条目。
//! 课程与团队文件中的角色取自用户在该组中的成员角色。

use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::files::entities::{FileAction, FilePermission, FileRecord, RefOwnerModel, RefPermModel};
use crate::models::groups::entities::{CourseRole, TeamRole};
use crate::models::users::entities::User;
use crate::services::authorization::NO_ACCESS;
use crate::storage::Storage;

pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";

/// 新建课程或团队文件的默认权限
pub fn default_permissions(owner: RefOwnerModel, students_can_edit: bool) -> Vec<FilePermission> {
    match owner {
        RefOwnerModel::User => Vec::new(),
        RefOwnerModel::Course | RefOwnerModel::Team => vec![
            FilePermission::for_role(ROLE_TEACHER, true, true, true),
            FilePermission::for_role(ROLE_STUDENT, students_can_edit, students_can_edit, false),
        ],
    }
}

/// 用户在文件所属组中的角色名
async fn group_role(
    storage: &Arc<dyn Storage>,
    user: &User,
    owner: RefOwnerModel,
    owner_id: i64,
) -> Result<Option<&'static str>> {
    let role = match owner {
        RefOwnerModel::User => None,
        RefOwnerModel::Course => storage
            .get_course_memberships(user.id)
            .await?
            .into_iter()
            .find(|m| m.group_id == owner_id)
            .map(|m| match m.role {
                CourseRole::Teacher | CourseRole::SubstituteTeacher => ROLE_TEACHER,
                CourseRole::Student => ROLE_STUDENT,
            }),
        RefOwnerModel::Team => storage
            .get_team_memberships(user.id)
            .await?
            .into_iter()
            .find(|m| m.group_id == owner_id)
            .map(|m| match m.role {
                TeamRole::Owner | TeamRole::Administrator | TeamRole::Leader => ROLE_TEACHER,
                TeamRole::Expert | TeamRole::Member => ROLE_STUDENT,
            }),
    };
    Ok(role)
}

/// 用户是否属于目标组，个人空间只属于本人
pub async fn is_member(
    storage: &Arc<dyn Storage>,
    user: &User,
    owner: RefOwnerModel,
    owner_id: i64,
) -> Result<bool> {
    match owner {
        RefOwnerModel::User => Ok(owner_id == user.id),
        _ => Ok(group_role(storage, user, owner, owner_id).await?.is_some()),
    }
}

pub async fn can(
    storage: &Arc<dyn Storage>,
    user: &User,
    file: &FileRecord,
    action: FileAction,
) -> Result<bool> {
    if file.ref_owner_model == RefOwnerModel::User && file.owner_id == user.id {
        return Ok(true);
    }

    let user_ref = user.id.to_string();
    if let Some(entry) = file
        .permissions
        .iter()
        .find(|p| p.ref_perm_model == RefPermModel::User && p.ref_id == user_ref)
    {
        return Ok(entry.allows(action));
    }

    let Some(role) = group_role(storage, user, file.ref_owner_model, file.owner_id).await? else {
        return Ok(false);
    };
    Ok(file
        .permissions
        .iter()
        .filter(|p| p.ref_perm_model == RefPermModel::Role && p.ref_id == role)
        .any(|p| p.allows(action)))
}

pub async fn can_read(storage: &Arc<dyn Storage>, user: &User, file: &FileRecord) -> Result<bool> {
    can(storage, user, file, FileAction::Read).await
}

pub async fn can_write(storage: &Arc<dyn Storage>, user: &User, file: &FileRecord) -> Result<bool> {
    can(storage, user, file, FileAction::Write).await
}

pub async fn can_delete(storage: &Arc<dyn Storage>, user: &User, file: &FileRecord) -> Result<bool> {
    can(storage, user, file, FileAction::Delete).await
}

/// 无权限时返回 Forbidden
pub async fn ensure(
    storage: &Arc<dyn Storage>,
    user: &User,
    file: &FileRecord,
    action: FileAction,
) -> Result<()> {
    if can(storage, user, file, action).await? {
        Ok(())
    } else {
        Err(SchulCloudError::authorization(NO_ACCESS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::requests::CreateFileRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[tokio::test]
    async fn test_course_file_permissions() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let student = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let outsider = seed_user(&storage, school_id, "ben@gym.de", UserRole::Student).await;
        let course = storage.create_course_impl(school_id, "Mathe", None).await.unwrap();
        storage
            .add_course_member_impl(course.id, teacher.id, CourseRole::Teacher)
            .await
            .unwrap();
        storage
            .add_course_member_impl(course.id, student.id, CourseRole::Student)
            .await
            .unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let file = storage
            .create_file(CreateFileRequest {
                name: "blatt.docx".to_string(),
                size: 0,
                file_type: "application/octet-stream".to_string(),
                storage_file_name: Some("x.docx".to_string()),
                parent_id: None,
                owner_id: course.id,
                ref_owner_model: RefOwnerModel::Course,
                creator_id: teacher.id,
                permissions: default_permissions(RefOwnerModel::Course, false),
            })
            .await
            .unwrap();

        assert!(can_write(&storage, &teacher, &file).await.unwrap());
        assert!(can_delete(&storage, &teacher, &file).await.unwrap());
        assert!(can_read(&storage, &student, &file).await.unwrap());
        assert!(!can_write(&storage, &student, &file).await.unwrap());
        assert!(!can_read(&storage, &outsider, &file).await.unwrap());

        let err = ensure(&storage, &outsider, &file, FileAction::Read).await.unwrap_err();
        assert_eq!(err.message(), NO_ACCESS);
    }

    #[test]
    fn test_personal_files_have_no_role_entries() {
        assert!(default_permissions(RefOwnerModel::User, true).is_empty());
        let team = default_permissions(RefOwnerModel::Team, true);
        assert!(team.iter().all(|p| p.read && p.write));
    }
}
