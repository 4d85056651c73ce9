//! 回收站实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trashbins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_trashbin(self) -> crate::models::users::entities::Trashbin {
        crate::models::users::entities::Trashbin {
            id: self.id,
            user_id: self.user_id,
            data: serde_json::from_str(&self.data).unwrap_or(serde_json::Value::Null),
            created_at: to_datetime(self.created_at),
        }
    }
}
