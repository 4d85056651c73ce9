use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::ldap::UniventionGroupUpdater;
use crate::ldap::group_update::ImportJob;
use crate::models::schools::entities::LdapSystem;
use crate::models::sync::requests::GroupUpdateRequest;
use crate::models::users::entities::User;
use crate::storage::Storage;

use super::run::find_system;

/// 用户所在的外部系统与其目录 ID
pub(crate) async fn directory_identity(
    storage: &Arc<dyn Storage>,
    user_id: i64,
) -> Result<(User, LdapSystem, String)> {
    let user = storage
        .get_user_by_id(user_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| SchulCloudError::not_found(format!("User {user_id} not found")))?;

    let Some(ldap_id) = user.ldap_id.clone() else {
        return Err(SchulCloudError::bad_request(format!(
            "User {user_id} is not managed by a directory"
        )));
    };

    let system_id = storage
        .get_school_by_id(user.school_id)
        .await?
        .and_then(|school| school.system_id)
        .ok_or_else(|| {
            SchulCloudError::bad_request(format!("School {} has no directory system", user.school_id))
        })?;
    let system = find_system(storage, system_id).await?;

    Ok((user, system, ldap_id))
}

pub async fn update_groups(
    storage: &Arc<dyn Storage>,
    updater: &UniventionGroupUpdater,
    req: GroupUpdateRequest,
) -> Result<ImportJob> {
    if req.groups.is_empty() {
        return Err(SchulCloudError::validation("At least one group is required"));
    }

    let (_, system, ldap_id) = directory_identity(storage, req.user_id).await?;
    updater
        .update_user_groups(&system, &ldap_id, req.action, &req.groups)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[tokio::test]
    async fn test_local_user_has_no_directory_identity() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let user = seed_user(&storage, school_id, "max@gym.de", UserRole::Student).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let err = directory_identity(&storage, user.id).await.unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let err = directory_identity(&storage, user.id + 100).await.unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
