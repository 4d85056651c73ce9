//! 学校实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schools")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub ldap_school_identifier: Option<String>,
    pub system_id: Option<i64>,
    pub current_year: Option<String>,
    pub federal_state: Option<String>,
    pub is_external: bool,
    pub in_maintenance: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_school(self) -> crate::models::schools::entities::School {
        crate::models::schools::entities::School {
            id: self.id,
            name: self.name,
            ldap_school_identifier: self.ldap_school_identifier,
            system_id: self.system_id,
            current_year: self.current_year,
            federal_state: self.federal_state,
            is_external: self.is_external,
            in_maintenance: self.in_maintenance,
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
