use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{file_permissions, files};
use crate::errors::{Result, SchulCloudError};
use crate::models::files::{
    entities::{FileRecord, RefOwnerModel},
    requests::CreateFileRequest,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建文件记录及其权限条目
    pub async fn create_file_impl(&self, req: CreateFileRequest) -> Result<FileRecord> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let file = FileActiveModel {
            name: Set(req.name),
            size: Set(req.size),
            file_type: Set(req.file_type),
            storage_file_name: Set(req.storage_file_name),
            is_directory: Set(false),
            parent_id: Set(req.parent_id),
            owner_id: Set(req.owner_id),
            ref_owner_model: Set(req.ref_owner_model.as_str().to_string()),
            creator_id: Set(req.creator_id),
            lock_id: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut permissions = Vec::with_capacity(req.permissions.len());
        for permission in req.permissions {
            let row = FilePermissionActiveModel {
                file_id: Set(file.id),
                ref_id: Set(permission.ref_id),
                ref_perm_model: Set(permission.ref_perm_model.as_str().to_string()),
                can_read: Set(permission.read),
                can_write: Set(permission.write),
                can_create: Set(permission.create),
                can_delete: Set(permission.delete),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            permissions.push(row);
        }

        txn.commit().await?;
        Ok(file.into_file(permissions))
    }

    pub async fn get_file_by_id_impl(&self, id: i64) -> Result<Option<FileRecord>> {
        let result = Files::find_by_id(id)
            .find_with_related(FilePermissions)
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询文件失败: {e}")))?;

        Ok(result
            .into_iter()
            .next()
            .map(|(file, permissions)| file.into_file(permissions)))
    }

    /// 某所有者在某目录下的文件，parent_id 为空表示根目录
    pub async fn list_files_by_owner_impl(
        &self,
        owner_model: RefOwnerModel,
        owner_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<FileRecord>> {
        let parent = match parent_id {
            Some(id) => files::Column::ParentId.eq(id),
            None => files::Column::ParentId.is_null(),
        };

        let result = Files::find()
            .filter(files::Column::RefOwnerModel.eq(owner_model.as_str()))
            .filter(files::Column::OwnerId.eq(owner_id))
            .filter(parent)
            .order_by_asc(files::Column::Name)
            .find_with_related(FilePermissions)
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询文件列表失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|(file, permissions)| file.into_file(permissions))
            .collect())
    }

    /// 比较并设置锁，expected 为空时要求当前无锁
    pub async fn compare_and_set_file_lock_impl(
        &self,
        id: i64,
        expected: Option<&str>,
        new_lock: Option<&str>,
    ) -> Result<bool> {
        let current = match expected {
            Some(lock) => Condition::all().add(files::Column::LockId.eq(lock)),
            None => Condition::all().add(files::Column::LockId.is_null()),
        };

        let result = Files::update_many()
            .col_expr(files::Column::LockId, Expr::value(new_lock.map(str::to_string)))
            .col_expr(
                files::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(files::Column::Id.eq(id))
            .filter(current)
            .exec(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新文件锁失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_file_contents_impl(&self, id: i64, size: i64) -> Result<Option<FileRecord>> {
        let Some(existing) = Files::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询文件失败: {e}")))?
        else {
            return Ok(None);
        };

        let version = existing.version + 1;
        let mut model = existing.into_active_model();
        model.size = Set(size);
        model.version = Set(version);
        model.updated_at = Set(chrono::Utc::now().timestamp());
        model
            .update(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新文件内容失败: {e}")))?;

        self.get_file_by_id_impl(id).await
    }

    pub async fn rename_file_impl(&self, id: i64, name: &str) -> Result<Option<FileRecord>> {
        let Some(existing) = Files::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询文件失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());
        model
            .update(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("重命名文件失败: {e}")))?;

        self.get_file_by_id_impl(id).await
    }

    pub async fn delete_file_impl(&self, id: i64) -> Result<bool> {
        let txn = self.db.begin().await?;
        FilePermissions::delete_many()
            .filter(file_permissions::Column::FileId.eq(id))
            .exec(&txn)
            .await?;
        let result = Files::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::entities::FilePermission;

    fn upload(name: &str) -> CreateFileRequest {
        CreateFileRequest {
            name: name.to_string(),
            size: 10,
            file_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                .to_string(),
            storage_file_name: Some("abc.docx".to_string()),
            parent_id: None,
            owner_id: 7,
            ref_owner_model: RefOwnerModel::User,
            creator_id: 7,
            permissions: vec![FilePermission::for_role("teacher", true, true, false)],
        }
    }

    #[tokio::test]
    async fn test_file_lock_compare_and_set() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let file = storage.create_file_impl(upload("a.docx")).await.unwrap();
        assert_eq!(file.permissions.len(), 1);

        assert!(
            storage
                .compare_and_set_file_lock_impl(file.id, None, Some("L1"))
                .await
                .unwrap()
        );
        // 已有锁时不能再按“无锁”抢占
        assert!(
            !storage
                .compare_and_set_file_lock_impl(file.id, None, Some("L2"))
                .await
                .unwrap()
        );
        assert!(
            storage
                .compare_and_set_file_lock_impl(file.id, Some("L1"), None)
                .await
                .unwrap()
        );

        let file = storage.get_file_by_id_impl(file.id).await.unwrap().unwrap();
        assert!(file.lock_id.is_none());
    }

    #[tokio::test]
    async fn test_update_contents_bumps_version() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let file = storage.create_file_impl(upload("a.docx")).await.unwrap();

        let updated = storage
            .update_file_contents_impl(file.id, 99)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.size, 99);
        assert_eq!(updated.version, file.version + 1);
        assert_eq!(updated.permissions, file.permissions);

        assert!(storage.update_file_contents_impl(9999, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete_by_owner() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let b = storage.create_file_impl(upload("b.odt")).await.unwrap();
        storage.create_file_impl(upload("a.docx")).await.unwrap();

        let listed = storage
            .list_files_by_owner_impl(RefOwnerModel::User, 7, None)
            .await
            .unwrap();
        let names: Vec<_> = listed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.docx", "b.odt"]);

        assert!(storage.delete_file_impl(b.id).await.unwrap());
        assert!(storage.get_file_by_id_impl(b.id).await.unwrap().is_none());
        assert!(
            storage
                .list_files_by_owner_impl(RefOwnerModel::Course, 7, None)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
