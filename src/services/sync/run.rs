use std::sync::Arc;

use tracing::info;

use crate::errors::{Result, SchulCloudError};
use crate::ldap::{DirectoryClient, strategy_for};
use crate::models::schools::entities::{CreateSystemRequest, LdapSystem};
use crate::models::sync::entities::SyncRunStats;
use crate::storage::Storage;
use crate::sync::{LdapSyncer, SyncQueue};

pub(crate) async fn find_system(storage: &Arc<dyn Storage>, system_id: i64) -> Result<LdapSystem> {
    storage
        .get_system_by_id(system_id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("System {system_id} not found")))
}

pub async fn create_system(
    storage: &Arc<dyn Storage>,
    req: CreateSystemRequest,
) -> Result<LdapSystem> {
    strategy_for(req.provider)?;
    if req.url.trim().is_empty() || req.root_path.trim().is_empty() {
        return Err(SchulCloudError::validation("LDAP url and root path are required"));
    }

    let system = storage.create_system(req).await?;
    info!("Registered LDAP system '{}' ({})", system.alias, system.id);
    Ok(system)
}

/// 目录读取完成即返回，数据写入由队列消费者完成
pub async fn run(
    storage: &Arc<dyn Storage>,
    directory: Arc<dyn DirectoryClient>,
    queue: Arc<dyn SyncQueue>,
    system_id: i64,
) -> Result<SyncRunStats> {
    let system = find_system(storage, system_id).await?;
    if !system.active {
        return Err(SchulCloudError::bad_request(format!(
            "System {system_id} is not active"
        )));
    }

    LdapSyncer::new(storage.clone(), directory, queue)
        .sync(&system)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldap::Ldap3Client;
    use crate::models::schools::entities::LdapProvider;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::sync::LocalSyncQueue;

    fn request(provider: LdapProvider) -> CreateSystemRequest {
        CreateSystemRequest {
            alias: "ucs".to_string(),
            provider,
            url: "ldaps://ucs.schule.de".to_string(),
            root_path: "dc=schule,dc=de".to_string(),
            search_user: "uid=sync".to_string(),
            search_password: "secret".to_string(),
            import_url: None,
            import_user: None,
            import_password: None,
        }
    }

    #[tokio::test]
    async fn test_create_system_rejects_unsupported_provider() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());

        assert!(create_system(&storage, request(LdapProvider::General)).await.is_err());

        let system = create_system(&storage, request(LdapProvider::Univention))
            .await
            .unwrap();
        assert!(system.active);
        assert!(system.last_sync_attempt.is_none());
    }

    #[tokio::test]
    async fn test_run_unknown_system() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let err = run(
            &storage,
            Arc::new(Ldap3Client::new(std::time::Duration::from_secs(1))),
            Arc::new(LocalSyncQueue::new()),
            42,
        )
        .await
        .unwrap_err();
        assert_eq!(err.message(), "System 42 not found");
    }
}
