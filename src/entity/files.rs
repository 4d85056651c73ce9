//! 文件实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub file_type: String,
    pub storage_file_name: Option<String>,
    pub is_directory: bool,
    pub parent_id: Option<i64>,
    pub owner_id: i64,
    pub ref_owner_model: String,
    pub creator_id: i64,
    pub lock_id: Option<String>,
    pub version: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::file_permissions::Entity")]
    FilePermissions,
}

impl Related<super::file_permissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FilePermissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_file(
        self,
        permissions: Vec<super::file_permissions::Model>,
    ) -> crate::models::files::entities::FileRecord {
        use crate::models::files::entities::{FileRecord, RefOwnerModel};

        FileRecord {
            id: self.id,
            name: self.name,
            size: self.size,
            file_type: self.file_type,
            storage_file_name: self.storage_file_name,
            is_directory: self.is_directory,
            parent_id: self.parent_id,
            owner_id: self.owner_id,
            ref_owner_model: self
                .ref_owner_model
                .parse::<RefOwnerModel>()
                .unwrap_or(RefOwnerModel::User),
            creator_id: self.creator_id,
            lock_id: self.lock_id,
            version: self.version,
            permissions: permissions
                .into_iter()
                .map(|p| p.into_file_permission())
                .collect(),
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
