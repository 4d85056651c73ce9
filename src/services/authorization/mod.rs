//! 实体级权限判定
//!
//! 学校权限来自用户角色，课程与团队权限来自用户在其中的成员角色。

pub mod roles;

use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::auth::permissions::Permission;
use crate::models::news::entities::NewsTargetModel;
use crate::models::users::entities::User;
use crate::storage::Storage;

pub use roles::{has_all, role_permissions};

pub const NO_ACCESS: &str = "You have no access.";

pub struct AuthorizationService {
    storage: Arc<dyn Storage>,
}

impl AuthorizationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 用户在某个实体上持有的权限
    pub async fn get_entity_permissions(
        &self,
        user: &User,
        model: NewsTargetModel,
        id: i64,
    ) -> Result<Vec<Permission>> {
        let permissions = match model {
            // 超级管理员可访问任意学校，但学校必须存在
            NewsTargetModel::School if user.role.is_superhero() => {
                if self.storage.get_school_by_id(id).await?.is_some() {
                    role_permissions(user.role).to_vec()
                } else {
                    Vec::new()
                }
            }
            NewsTargetModel::School if user.school_id == id => role_permissions(user.role).to_vec(),
            NewsTargetModel::School => Vec::new(),
            NewsTargetModel::Course => self
                .storage
                .get_course_memberships(user.id)
                .await?
                .into_iter()
                .find(|m| m.group_id == id)
                .map(|m| roles::course_role_permissions(m.role).to_vec())
                .unwrap_or_default(),
            NewsTargetModel::Team => self
                .storage
                .get_team_memberships(user.id)
                .await?
                .into_iter()
                .find(|m| m.group_id == id)
                .map(|m| roles::team_role_permissions(m.role).to_vec())
                .unwrap_or_default(),
        };
        Ok(permissions)
    }

    /// 缺少任一所需权限时返回 Forbidden
    pub async fn check_entity_permissions(
        &self,
        user: &User,
        model: NewsTargetModel,
        id: i64,
        required: &[Permission],
    ) -> Result<()> {
        let granted = self.get_entity_permissions(user, model, id).await?;
        if has_all(&granted, required) {
            Ok(())
        } else {
            Err(SchulCloudError::authorization(NO_ACCESS))
        }
    }

    /// 用户持有全部所需权限的实体 ID
    pub async fn get_permitted_entities(
        &self,
        user: &User,
        model: NewsTargetModel,
        required: &[Permission],
    ) -> Result<Vec<i64>> {
        let ids = match model {
            NewsTargetModel::School => {
                if !has_all(role_permissions(user.role), required) {
                    Vec::new()
                } else if user.role.is_superhero() {
                    self.storage.list_school_ids().await?
                } else {
                    vec![user.school_id]
                }
            }
            NewsTargetModel::Course => self
                .storage
                .get_course_memberships(user.id)
                .await?
                .into_iter()
                .filter(|m| has_all(roles::course_role_permissions(m.role), required))
                .map(|m| m.group_id)
                .collect(),
            NewsTargetModel::Team => self
                .storage
                .get_team_memberships(user.id)
                .await?
                .into_iter()
                .filter(|m| has_all(roles::team_role_permissions(m.role), required))
                .map(|m| m.group_id)
                .collect(),
        };
        Ok(ids)
    }
}

/// 用户角色是否包含全部权限，否则返回 Forbidden
pub fn ensure_role_permissions(user: &User, required: &[Permission]) -> Result<()> {
    if has_all(role_permissions(user.role), required) {
        Ok(())
    } else {
        Err(SchulCloudError::authorization(NO_ACCESS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::groups::entities::CourseRole;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[tokio::test]
    async fn test_course_permissions_follow_membership() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let student = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let course = storage.create_course_impl(school_id, "Mathe", None).await.unwrap();
        storage
            .add_course_member_impl(course.id, teacher.id, CourseRole::Teacher)
            .await
            .unwrap();
        storage
            .add_course_member_impl(course.id, student.id, CourseRole::Student)
            .await
            .unwrap();

        let service = AuthorizationService::new(Arc::new(storage));
        service
            .check_entity_permissions(
                &teacher,
                NewsTargetModel::Course,
                course.id,
                &[Permission::NewsCreate],
            )
            .await
            .unwrap();

        let err = service
            .check_entity_permissions(
                &student,
                NewsTargetModel::Course,
                course.id,
                &[Permission::NewsCreate],
            )
            .await
            .unwrap_err();
        assert_eq!(err.message(), NO_ACCESS);

        let editable = service
            .get_permitted_entities(&student, NewsTargetModel::Course, &[Permission::NewsEdit])
            .await
            .unwrap();
        assert!(editable.is_empty());
        let readable = service
            .get_permitted_entities(&student, NewsTargetModel::Course, &[Permission::NewsView])
            .await
            .unwrap();
        assert_eq!(readable, vec![course.id]);
    }

    #[tokio::test]
    async fn test_school_permissions_require_membership() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let own = seed_school(&storage, "Eigene").await;
        let other = seed_school(&storage, "Fremde").await;
        let teacher = seed_user(&storage, own, "lehrer@gym.de", UserRole::Teacher).await;
        let hero = seed_user(&storage, own, "hero@gym.de", UserRole::Superhero).await;

        let service = AuthorizationService::new(Arc::new(storage));
        assert!(
            service
                .get_entity_permissions(&teacher, NewsTargetModel::School, other)
                .await
                .unwrap()
                .is_empty()
        );
        let schools = service
            .get_permitted_entities(&hero, NewsTargetModel::School, &[Permission::NewsView])
            .await
            .unwrap();
        assert_eq!(schools, vec![own, other]);
    }

    #[tokio::test]
    async fn test_superhero_gets_nothing_on_missing_school() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let own = seed_school(&storage, "Eigene").await;
        let hero = seed_user(&storage, own, "hero@gym.de", UserRole::Superhero).await;

        let service = AuthorizationService::new(Arc::new(storage));
        assert!(
            !service
                .get_entity_permissions(&hero, NewsTargetModel::School, own)
                .await
                .unwrap()
                .is_empty()
        );
        let err = service
            .check_entity_permissions(
                &hero,
                NewsTargetModel::School,
                own + 1000,
                &[Permission::NewsCreate],
            )
            .await
            .unwrap_err();
        assert_eq!(err.message(), NO_ACCESS);
    }
}
