//! 同意书实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "consents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub user_privacy_consent: bool,
    pub user_terms_consent: bool,
    pub parent_privacy_consent: Option<bool>,
    pub parent_terms_consent: Option<bool>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_consent(self) -> crate::models::users::entities::Consent {
        crate::models::users::entities::Consent {
            id: self.id,
            user_id: self.user_id,
            user_privacy_consent: self.user_privacy_consent,
            user_terms_consent: self.user_terms_consent,
            parent_privacy_consent: self.parent_privacy_consent,
            parent_terms_consent: self.parent_terms_consent,
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
