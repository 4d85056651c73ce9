use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::files::entities::{FileAction, FileRecord, RefOwnerModel};
use crate::models::users::entities::User;
use crate::services::authorization::NO_ACCESS;
use crate::storage::Storage;

use super::blob::BlobStore;
use super::permissions::{ensure, is_member};

pub async fn find_file(storage: &Arc<dyn Storage>, id: i64) -> Result<FileRecord> {
    storage
        .get_file_by_id(id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("File {id} not found")))
}

/// 读取文件内容，需要读权限
pub async fn download(
    storage: &Arc<dyn Storage>,
    blobs: &BlobStore,
    user: &User,
    id: i64,
) -> Result<(FileRecord, Vec<u8>)> {
    let file = find_file(storage, id).await?;
    ensure(storage, user, &file, FileAction::Read).await?;

    let storage_file_name = file
        .storage_file_name
        .as_deref()
        .ok_or_else(|| SchulCloudError::bad_request("Directories cannot be downloaded"))?;
    let bytes = blobs.read(storage_file_name).await?;
    Ok((file, bytes))
}

/// 列出某个所有者目录下的文件
pub async fn list(
    storage: &Arc<dyn Storage>,
    user: &User,
    owner_model: Option<RefOwnerModel>,
    owner_id: Option<i64>,
    parent_id: Option<i64>,
) -> Result<Vec<FileRecord>> {
    let owner_model = owner_model.unwrap_or(RefOwnerModel::User);
    let owner_id = owner_id.unwrap_or(user.id);
    if !is_member(storage, user, owner_model, owner_id).await? {
        return Err(SchulCloudError::authorization(NO_ACCESS));
    }
    storage
        .list_files_by_owner(owner_model, owner_id, parent_id)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::requests::CreateFileRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[tokio::test]
    async fn test_download_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = BlobStore::new(dir.path());
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let anna = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let ben = seed_user(&storage, school_id, "ben@gym.de", UserRole::Student).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        blobs.write("abc.txt", b"notizen").await.unwrap();
        let file = storage
            .create_file(CreateFileRequest {
                name: "notizen.txt".to_string(),
                size: 7,
                file_type: "text/plain".to_string(),
                storage_file_name: Some("abc.txt".to_string()),
                parent_id: None,
                owner_id: anna.id,
                ref_owner_model: RefOwnerModel::User,
                creator_id: anna.id,
                permissions: Vec::new(),
            })
            .await
            .unwrap();

        let (record, bytes) = download(&storage, &blobs, &anna, file.id).await.unwrap();
        assert_eq!(record.name, "notizen.txt");
        assert_eq!(bytes, b"notizen");

        let err = download(&storage, &blobs, &ben, file.id).await.unwrap_err();
        assert_eq!(err.message(), NO_ACCESS);

        let files = list(&storage, &anna, None, None, None).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(list(&storage, &ben, None, Some(anna.id), None).await.is_err());
    }
}
