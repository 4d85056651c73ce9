use std::path::Path;
use std::sync::Arc;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};
use crate::models::auth::permissions::Permission;
use crate::models::files::{
    entities::{FileRecord, RefOwnerModel},
    requests::{CreateFileRequest, UploadParams},
};
use crate::models::users::entities::User;
use crate::services::authorization::{NO_ACCESS, ensure_role_permissions};
use crate::storage::Storage;
use crate::utils::random_code::generate_storage_file_name;
use crate::utils::validate_magic_bytes;

use super::blob::BlobStore;
use super::permissions::{default_permissions, is_member};

/// 上传目标（所有者类型, 所有者 ID）
pub async fn resolve_target(
    storage: &Arc<dyn Storage>,
    user: &User,
    params: &UploadParams,
) -> Result<(RefOwnerModel, i64)> {
    ensure_role_permissions(user, &[Permission::FileCreate])?;

    let owner_model = params.owner_model.unwrap_or(RefOwnerModel::User);
    let owner_id = params.owner_id.unwrap_or(user.id);
    if !is_member(storage, user, owner_model, owner_id).await? {
        return Err(SchulCloudError::authorization(NO_ACCESS));
    }

    if let Some(parent_id) = params.parent_id {
        let parent = storage
            .get_file_by_id(parent_id)
            .await?
            .ok_or_else(|| SchulCloudError::not_found(format!("File {parent_id} not found")))?;
        if !parent.is_directory
            || parent.ref_owner_model != owner_model
            || parent.owner_id != owner_id
        {
            return Err(SchulCloudError::bad_request("Invalid parent directory"));
        }
    }

    Ok((owner_model, owner_id))
}

/// 扩展名（小写，含点号），不在允许列表中时报错
pub fn checked_extension(original_name: &str, allowed_types: &[String]) -> Result<String> {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();

    if !allowed_types.iter().any(|t| t.to_lowercase() == extension) {
        return Err(SchulCloudError::bad_request("File type not allowed"));
    }
    Ok(extension)
}

pub async fn handle_upload(
    storage: &Arc<dyn Storage>,
    user: &User,
    params: UploadParams,
    mut payload: Multipart,
) -> Result<FileRecord> {
    let (owner_model, owner_id) = resolve_target(storage, user, &params).await?;

    let config = AppConfig::get();
    let blobs = BlobStore::from_config();
    blobs.ensure_dir().await?;

    let mut uploaded: Option<(String, String, String, i64)> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| SchulCloudError::bad_request(format!("Invalid multipart payload: {e}")))?
    {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        if name != "file" {
            continue;
        }
        if uploaded.is_some() {
            return Err(SchulCloudError::bad_request(
                "Only one file can be uploaded at a time",
            ));
        }

        let original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let extension = checked_extension(&original_name, &config.upload.allowed_types)?;
        let file_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let stored_name = generate_storage_file_name(Some(&extension));
        let path = blobs.path(&stored_name);
        let mut out = tokio::fs::File::create(&path).await?;

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = chunk
                .map_err(|e| SchulCloudError::bad_request(format!("Upload interrupted: {e}")))?;

            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    blobs.remove(&stored_name).await?;
                    return Err(SchulCloudError::bad_request(
                        "File content does not match its extension",
                    ));
                }
            }

            total_size += data.len();
            if total_size > config.upload.max_size {
                blobs.remove(&stored_name).await?;
                return Err(SchulCloudError::bad_request("File size exceeds the limit"));
            }
            out.write_all(&data).await?;
        }
        out.flush().await?;

        uploaded = Some((original_name, stored_name, file_type, total_size as i64));
    }

    let Some((original_name, stored_name, file_type, size)) = uploaded else {
        return Err(SchulCloudError::bad_request("No file found in upload payload"));
    };

    let result = storage
        .create_file(CreateFileRequest {
            name: original_name,
            size,
            file_type,
            storage_file_name: Some(stored_name.clone()),
            parent_id: params.parent_id,
            owner_id,
            ref_owner_model: owner_model,
            creator_id: user.id,
            permissions: default_permissions(owner_model, params.students_can_edit),
        })
        .await;

    match result {
        Ok(file) => {
            tracing::info!("File {} uploaded by user {}", file.id, user.id);
            Ok(file)
        }
        Err(e) => {
            blobs.remove(&stored_name).await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[test]
    fn test_checked_extension() {
        let allowed = vec![".pdf".to_string(), ".docx".to_string()];
        assert_eq!(checked_extension("Blatt.PDF", &allowed).unwrap(), ".pdf");
        assert!(checked_extension("virus.exe", &allowed).is_err());
        assert!(checked_extension("ohne_endung", &allowed).is_err());
    }

    #[tokio::test]
    async fn test_resolve_target() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let student = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let parent = seed_user(&storage, school_id, "mutter@web.de", UserRole::Parent).await;
        let course = storage.create_course_impl(school_id, "Mathe", None).await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let own = resolve_target(&storage, &student, &UploadParams::default())
            .await
            .unwrap();
        assert_eq!(own, (RefOwnerModel::User, student.id));

        let foreign = UploadParams {
            owner_model: Some(RefOwnerModel::Course),
            owner_id: Some(course.id),
            ..Default::default()
        };
        let err = resolve_target(&storage, &student, &foreign).await.unwrap_err();
        assert_eq!(err.message(), NO_ACCESS);

        assert!(resolve_target(&storage, &parent, &UploadParams::default()).await.is_err());
    }
}
