//! LDAP 系统实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "systems")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub alias: String,
    pub ldap_provider: String,
    pub ldap_url: String,
    pub ldap_root_path: String,
    pub ldap_search_user: String,
    pub ldap_search_password: String,
    pub import_url: Option<String>,
    pub import_user: Option<String>,
    pub import_password: Option<String>,
    pub ldap_active: bool,
    pub last_sync_attempt: Option<i64>,
    pub last_successful_full_sync: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_ldap_system(self) -> crate::models::schools::entities::LdapSystem {
        use crate::models::schools::entities::{LdapProvider, LdapSystem};

        LdapSystem {
            id: self.id,
            alias: self.alias,
            provider: self
                .ldap_provider
                .parse::<LdapProvider>()
                .unwrap_or(LdapProvider::General),
            url: self.ldap_url,
            root_path: self.ldap_root_path,
            search_user: self.ldap_search_user,
            search_password: self.ldap_search_password,
            import_url: self.import_url,
            import_user: self.import_user,
            import_password: self.import_password,
            active: self.ldap_active,
            last_sync_attempt: self.last_sync_attempt.map(to_datetime),
            last_successful_full_sync: self.last_successful_full_sync.map(to_datetime),
        }
    }
}
