use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::registration::{requests::HashRequest, responses::HashResponse};
use crate::models::users::requests::UpdateUserRequest;
use crate::storage::Storage;
use crate::utils::password::url_safe_hash;

/// 生成注册链接使用的哈希，`save` 与 `patch_user` 同时设置时写入对应邮箱用户的导入哈希
pub async fn hash(storage: &Arc<dyn Storage>, req: HashRequest) -> Result<HashResponse> {
    let to_hash = req
        .to_hash
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SchulCloudError::bad_request("Please set toHash key."))?;

    let hash = url_safe_hash(to_hash)?;

    if req.save && req.patch_user {
        let user = storage
            .get_user_by_email(to_hash)
            .await?
            .ok_or_else(|| SchulCloudError::not_found(format!("User with email {to_hash} not found")))?;
        storage
            .update_user(
                user.id,
                UpdateUserRequest {
                    import_hash: Some(Some(hash.clone())),
                    ..Default::default()
                },
            )
            .await?;
    }

    Ok(HashResponse { hash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[tokio::test]
    async fn test_hash_requires_input() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let err = hash(&storage, HashRequest::default()).await.unwrap_err();
        assert_eq!(err.message(), "Please set toHash key.");
    }

    #[tokio::test]
    async fn test_saved_hash_patches_user() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let user = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let response = hash(
            &storage,
            HashRequest {
                to_hash: Some("anna@gym.de".to_string()),
                save: true,
                patch_user: true,
            },
        )
        .await
        .unwrap();
        assert!(!response.hash.contains('/') && !response.hash.contains('+'));

        let found = storage.get_user_by_import_hash(&response.hash).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }
}
