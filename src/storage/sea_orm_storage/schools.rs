use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{schools, systems};
use crate::errors::{Result, SchulCloudError};
use crate::models::schools::entities::{
    CreateSchoolRequest, CreateSystemRequest, LdapSystem, School,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_school_impl(&self, req: CreateSchoolRequest) -> Result<School> {
        let now = chrono::Utc::now().timestamp();

        let model = SchoolActiveModel {
            name: Set(req.name),
            ldap_school_identifier: Set(req.ldap_school_identifier),
            system_id: Set(req.system_id),
            current_year: Set(req.current_year),
            federal_state: Set(req.federal_state),
            is_external: Set(req.is_external),
            in_maintenance: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建学校失败: {e}")))?;

        Ok(result.into_school())
    }

    pub async fn get_school_by_id_impl(&self, id: i64) -> Result<Option<School>> {
        let result = Schools::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询学校失败: {e}")))?;

        Ok(result.map(|m| m.into_school()))
    }

    /// 按外部系统中的标识（Univention 中为 OU）查找学校
    pub async fn get_school_by_ldap_identifier_impl(
        &self,
        system_id: i64,
        identifier: &str,
    ) -> Result<Option<School>> {
        let result = Schools::find()
            .filter(schools::Column::SystemId.eq(system_id))
            .filter(schools::Column::LdapSchoolIdentifier.eq(identifier))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询学校失败: {e}")))?;

        Ok(result.map(|m| m.into_school()))
    }

    pub async fn update_school_name_impl(&self, id: i64, name: &str) -> Result<Option<School>> {
        let Some(existing) = Schools::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询学校失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新学校失败: {e}")))?;

        Ok(Some(result.into_school()))
    }

    pub async fn list_school_ids_impl(&self) -> Result<Vec<i64>> {
        Schools::find()
            .select_only()
            .column(schools::Column::Id)
            .order_by_asc(schools::Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询学校失败: {e}")))
    }

    pub async fn create_system_impl(&self, req: CreateSystemRequest) -> Result<LdapSystem> {
        let now = chrono::Utc::now().timestamp();

        let model = SystemActiveModel {
            alias: Set(req.alias),
            ldap_provider: Set(req.provider.as_str().to_string()),
            ldap_url: Set(req.url),
            ldap_root_path: Set(req.root_path),
            ldap_search_user: Set(req.search_user),
            ldap_search_password: Set(req.search_password),
            import_url: Set(req.import_url),
            import_user: Set(req.import_user),
            import_password: Set(req.import_password),
            ldap_active: Set(true),
            last_sync_attempt: Set(None),
            last_successful_full_sync: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建外部系统失败: {e}")))?;

        Ok(result.into_ldap_system())
    }

    pub async fn get_system_by_id_impl(&self, id: i64) -> Result<Option<LdapSystem>> {
        let result = Systems::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询外部系统失败: {e}")))?;

        Ok(result.map(|m| m.into_ldap_system()))
    }

    pub async fn update_system_sync_attempt_impl(&self, id: i64, at: i64) -> Result<bool> {
        self.touch_system_column(id, systems::Column::LastSyncAttempt, at)
            .await
    }

    pub async fn update_system_successful_sync_impl(&self, id: i64, at: i64) -> Result<bool> {
        self.touch_system_column(id, systems::Column::LastSuccessfulFullSync, at)
            .await
    }

    async fn touch_system_column(&self, id: i64, column: systems::Column, at: i64) -> Result<bool> {
        let result = Systems::update_many()
            .col_expr(column, Expr::value(at))
            .col_expr(systems::Column::UpdatedAt, Expr::value(at))
            .filter(systems::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新同步时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schools::entities::LdapProvider;

    #[tokio::test]
    async fn test_sync_timestamps_are_recorded() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let system = crate::storage::sea_orm_storage::test_support::seed_system(&storage).await;
        assert_eq!(system.provider, LdapProvider::Univention);
        assert!(system.last_sync_attempt.is_none());

        assert!(
            storage
                .update_system_sync_attempt_impl(system.id, 1_700_000_000)
                .await
                .unwrap()
        );
        let system = storage.get_system_by_id_impl(system.id).await.unwrap().unwrap();
        assert_eq!(
            system.last_sync_attempt.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert!(system.last_successful_full_sync.is_none());
    }

    #[tokio::test]
    async fn test_school_lookup_by_ldap_identifier() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let system = crate::storage::sea_orm_storage::test_support::seed_system(&storage).await;
        storage
            .create_school_impl(CreateSchoolRequest {
                name: "Gymnasium".to_string(),
                ldap_school_identifier: Some("gym1".to_string()),
                system_id: Some(system.id),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(
            storage
                .get_school_by_ldap_identifier_impl(system.id, "gym1")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            storage
                .get_school_by_ldap_identifier_impl(system.id + 1, "gym1")
                .await
                .unwrap()
                .is_none()
        );
    }
}
