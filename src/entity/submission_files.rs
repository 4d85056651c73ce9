//! 提交附件实体

use sea_orm::entity::prelude::*;

pub const KIND_STUDENT: &str = "student";
pub const KIND_GRADE: &str = "grade";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submission_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub file_id: i64,
    /// student / grade
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
