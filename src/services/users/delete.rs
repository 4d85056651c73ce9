use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::users::{entities::User, responses::DeleteUserResponse};
use crate::services::authorization::NO_ACCESS;
use crate::storage::Storage;

/// 删除用户：保存回收站记录后以墓碑记录替换
///
/// 跨校删除仅超级管理员可执行。
pub async fn delete_user(
    storage: &Arc<dyn Storage>,
    current_user: &User,
    id: i64,
) -> Result<DeleteUserResponse> {
    let user = storage
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("User {id} not found")))?;

    // 先校验学校归属，再判断是否已删除
    if user.school_id != current_user.school_id && !current_user.role.is_superhero() {
        return Err(SchulCloudError::authorization(NO_ACCESS));
    }
    if user.is_deleted() {
        return Err(SchulCloudError::not_found(format!("User {id} not found")));
    }

    let account = storage.get_account_by_user_id(id).await?;
    let references = storage.get_user_task_references(id).await?;

    let data = serde_json::json!({
        "user": user,
        "account": account,
        "tasks": references,
    });
    let trashbin = storage.create_trashbin(id, data).await.map_err(|e| {
        tracing::error!("Failed to save trashbin data for user {}: {}", id, e);
        SchulCloudError::general(format!("Failed to save trashbin data for user {id}"))
    })?;

    storage.tombstone_user(id, &references).await?;
    tracing::info!(
        "User {} deleted by {}, trashbin {}",
        id,
        current_user.id,
        trashbin.id
    );

    Ok(DeleteUserResponse {
        user_id: id,
        trashbin_id: trashbin.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{
        seed_school, seed_user, seed_user_with_account,
    };

    #[tokio::test]
    async fn test_delete_user_leaves_tombstone() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let admin = seed_user(&storage, school_id, "admin@gym.de", UserRole::Administrator).await;
        let student =
            seed_user_with_account(&storage, school_id, "anna@gym.de", UserRole::Student, None)
                .await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let result = delete_user(&storage, &admin, student.id).await.unwrap();
        assert!(result.trashbin_id > 0);

        let tombstone = storage.get_user_by_id(student.id).await.unwrap().unwrap();
        assert!(tombstone.is_deleted());
        assert_eq!(tombstone.first_name, "DELETED");
        assert!(storage.get_account_by_user_id(student.id).await.unwrap().is_none());

        let again = delete_user(&storage, &admin, student.id).await.unwrap_err();
        assert_eq!(again.message(), format!("User {} not found", student.id));
    }

    #[tokio::test]
    async fn test_delete_user_of_other_school_is_forbidden() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let own = seed_school(&storage, "Eigene").await;
        let other = seed_school(&storage, "Fremde").await;
        let admin = seed_user(&storage, own, "admin@gym.de", UserRole::Administrator).await;
        let hero = seed_user(&storage, own, "hero@gym.de", UserRole::Superhero).await;
        let stranger = seed_user(&storage, other, "x@other.de", UserRole::Student).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let err = delete_user(&storage, &admin, stranger.id).await.unwrap_err();
        assert_eq!(err.message(), NO_ACCESS);

        delete_user(&storage, &hero, stranger.id).await.unwrap();

        // 已删除的外校用户依旧返回无权限
        let err = delete_user(&storage, &admin, stranger.id).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
        assert_eq!(err.message(), NO_ACCESS);

        let err = delete_user(&storage, &hero, stranger.id).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 404);
    }
}
