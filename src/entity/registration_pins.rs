//! 注册验证码实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "registration_pins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub pin: String,
    pub verified: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_registration_pin(self) -> crate::models::registration::responses::RegistrationPin {
        crate::models::registration::responses::RegistrationPin {
            id: self.id,
            email: self.email,
            pin: self.pin,
            verified: self.verified,
            created_at: to_datetime(self.created_at),
        }
    }
}
