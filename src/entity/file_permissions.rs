//! 文件权限实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "file_permissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub file_id: i64,
    pub ref_id: String,
    pub ref_perm_model: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_create: bool,
    pub can_delete: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::files::Entity",
        from = "Column::FileId",
        to = "super::files::Column::Id",
        on_delete = "Cascade"
    )]
    File,
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_file_permission(self) -> crate::models::files::entities::FilePermission {
        use crate::models::files::entities::{FilePermission, RefPermModel};

        FilePermission {
            ref_id: self.ref_id,
            ref_perm_model: self
                .ref_perm_model
                .parse::<RefPermModel>()
                .unwrap_or(RefPermModel::User),
            read: self.can_read,
            write: self.can_write,
            create: self.can_create,
            delete: self.can_delete,
        }
    }
}
