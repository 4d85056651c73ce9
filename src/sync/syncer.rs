use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use super::queue::SyncQueue;
use crate::errors::Result;
use crate::ldap::{DirectoryClient, LdapStrategy, strategy_for};
use crate::models::schools::entities::{LdapSystem, School};
use crate::models::sync::entities::{LdapSchool, SchoolSyncStats, SyncMessage, SyncRunStats};
use crate::storage::Storage;

/// 从目录读取学校、用户与班级，并作为同步消息入队
pub struct LdapSyncer {
    storage: Arc<dyn Storage>,
    directory: Arc<dyn DirectoryClient>,
    queue: Arc<dyn SyncQueue>,
}

impl LdapSyncer {
    pub fn new(
        storage: Arc<dyn Storage>,
        directory: Arc<dyn DirectoryClient>,
        queue: Arc<dyn SyncQueue>,
    ) -> Self {
        Self {
            storage,
            directory,
            queue,
        }
    }

    pub async fn sync(&self, system: &LdapSystem) -> Result<SyncRunStats> {
        let strategy = strategy_for(system.provider)?;
        let mut stats = SyncRunStats {
            system_id: system.id,
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        self.attempt_run(system).await?;
        info!("Starting LDAP sync for system '{}' ({})", system.alias, system.id);

        let schools = match self.fetch_schools(system, strategy.as_ref()).await {
            Ok(schools) => schools,
            Err(e) => {
                error!("Failed to fetch schools from system {}: {}", system.id, e);
                stats
                    .errors
                    .push(format!("LDAP sync failed for system \"{}\" ({}).", system.alias, system.id));
                stats.finished_at = Some(Utc::now());
                return Ok(stats);
            }
        };

        for school in &schools {
            self.queue
                .publish(&SyncMessage::SyncSchool {
                    system_id: system.id,
                    school: school.clone(),
                })
                .await?;
        }

        // 查询互不依赖，并发进行
        let existing = join_all(
            schools
                .iter()
                .map(|school| self.storage.get_school_by_ldap_identifier(system.id, &school.ldap_ou)),
        )
        .await;

        for (school, record) in schools.iter().zip(existing) {
            let record = record?;
            let mut school_stats = SchoolSyncStats {
                ldap_ou: school.ldap_ou.clone(),
                name: record
                    .as_ref()
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| school.display_name.clone()),
                ..Default::default()
            };

            if record.as_ref().is_some_and(|r| r.in_maintenance) {
                debug!("Skipping school '{}' in maintenance", school_stats.name);
                school_stats.skipped = true;
                stats.schools.push(school_stats);
                continue;
            }

            match self
                .sync_school_data(system, strategy.as_ref(), school, &mut school_stats)
                .await
            {
                Ok(()) => school_stats.success = true,
                Err(e) => {
                    error!("LDAP sync of school '{}' failed: {}", school.ldap_ou, e);
                    stats.errors.push(failure_message(school, record.as_ref()));
                }
            }
            stats.schools.push(school_stats);
        }

        stats.finished_at = Some(Utc::now());
        stats.success = stats.errors.is_empty();
        if stats.success {
            self.persist_run(system).await?;
        } else {
            warn!(
                "LDAP sync for system {} finished with {} error(s)",
                system.id,
                stats.errors.len()
            );
        }

        Ok(stats)
    }

    async fn attempt_run(&self, system: &LdapSystem) -> Result<()> {
        self.storage
            .update_system_sync_attempt(system.id, Utc::now().timestamp())
            .await?;
        Ok(())
    }

    async fn persist_run(&self, system: &LdapSystem) -> Result<()> {
        self.storage
            .update_system_successful_sync(system.id, Utc::now().timestamp())
            .await?;
        info!("LDAP sync for system {} completed", system.id);
        Ok(())
    }

    async fn fetch_schools(
        &self,
        system: &LdapSystem,
        strategy: &dyn LdapStrategy,
    ) -> Result<Vec<LdapSchool>> {
        let entries = self
            .directory
            .search(system, &strategy.schools_query(system))
            .await?;
        Ok(entries.iter().filter_map(|e| strategy.map_school(e)).collect())
    }

    async fn sync_school_data(
        &self,
        system: &LdapSystem,
        strategy: &dyn LdapStrategy,
        school: &LdapSchool,
        stats: &mut SchoolSyncStats,
    ) -> Result<()> {
        let entries = self
            .directory
            .search(system, &strategy.users_query(system, school))
            .await?;
        let users: Vec<_> = entries.iter().filter_map(|e| strategy.map_user(e)).collect();
        if users.len() < entries.len() {
            debug!(
                "Ignored {} directory users of '{}' without role or e-mail",
                entries.len() - users.len(),
                school.ldap_ou
            );
        }
        for user in users {
            self.queue
                .publish(&SyncMessage::SyncUser {
                    system_id: system.id,
                    school_ou: school.ldap_ou.clone(),
                    user,
                })
                .await?;
            stats.users += 1;
        }

        let entries = self
            .directory
            .search(system, &strategy.classes_query(system, school))
            .await?;
        for class in entries.iter().filter_map(|e| strategy.map_class(e, school)) {
            self.queue
                .publish(&SyncMessage::SyncClass {
                    system_id: system.id,
                    school_ou: school.ldap_ou.clone(),
                    class,
                })
                .await?;
            stats.classes += 1;
        }

        Ok(())
    }
}

fn failure_message(school: &LdapSchool, record: Option<&School>) -> String {
    match record {
        Some(record) => format!("LDAP sync failed for school \"{}\" ({}).", record.name, record.id),
        None => format!(
            "LDAP sync failed for school \"{}\" ({}).",
            school.display_name, school.ldap_ou
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::SchulCloudError;
    use crate::ldap::{DirectoryEntry, SearchQuery};
    use crate::storage::sea_orm_storage::{SeaOrmStorage, test_support::seed_system};
    use crate::sync::queue::LocalSyncQueue;

    /// 按搜索基准返回固定条目，`fail_base` 命中时报错
    struct FakeDirectory {
        fail_base: Option<String>,
    }

    #[async_trait]
    impl DirectoryClient for FakeDirectory {
        async fn search(
            &self,
            _system: &LdapSystem,
            query: &SearchQuery,
        ) -> Result<Vec<DirectoryEntry>> {
            if self.fail_base.as_deref() == Some(query.base.as_str()) {
                return Err(SchulCloudError::directory("connection reset"));
            }
            let entries = if query.base == "dc=schule,dc=de" {
                vec![
                    DirectoryEntry::new("ou=gym1,dc=schule,dc=de")
                        .with_attr("ou", &["gym1"])
                        .with_attr("displayName", &["Gymnasium Eins"]),
                    DirectoryEntry::new("ou=gs2,dc=schule,dc=de")
                        .with_attr("ou", &["gs2"])
                        .with_attr("displayName", &["Grundschule Zwei"]),
                ]
            } else if query.base.starts_with("cn=users") {
                vec![
                    DirectoryEntry::new("uid=max,cn=users")
                        .with_attr("entryUUID", &["uuid-max"])
                        .with_attr("uid", &["max"])
                        .with_attr("mail", &["max@schule.de"])
                        .with_attr("objectClass", &["ucsschoolStudent"]),
                ]
            } else {
                vec![
                    DirectoryEntry::new("cn=gym1-5a,cn=klassen")
                        .with_attr("cn", &["gym1-5a"])
                        .with_attr("uniqueMember", &["uid=max,cn=users"]),
                ]
            };
            Ok(entries)
        }
    }

    async fn drain(queue: &LocalSyncQueue) -> Vec<SyncMessage> {
        let mut messages = Vec::new();
        while let Some(message) = queue.receive(Duration::from_millis(20)).await.unwrap() {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_successful_run_emits_messages_and_persists() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let system = seed_system(&storage).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let queue = Arc::new(LocalSyncQueue::new());
        let syncer = LdapSyncer::new(
            storage.clone(),
            Arc::new(FakeDirectory { fail_base: None }),
            queue.clone(),
        );

        let stats = syncer.sync(&system).await.unwrap();
        assert!(stats.success);
        assert_eq!(stats.schools.len(), 2);
        assert!(stats.schools.iter().all(|s| s.users == 1 && s.classes == 1));

        let messages = drain(&queue).await;
        let actions: Vec<_> = messages.iter().map(|m| m.action()).collect();
        assert_eq!(&actions[..2], &["sync_school", "sync_school"]);
        assert_eq!(messages.len(), 6);

        let system = storage.get_system_by_id(system.id).await.unwrap().unwrap();
        assert!(system.last_sync_attempt.is_some());
        assert!(system.last_successful_full_sync.is_some());
    }

    #[tokio::test]
    async fn test_school_failure_is_recorded() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let system = seed_system(&storage).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let syncer = LdapSyncer::new(
            storage.clone(),
            Arc::new(FakeDirectory {
                fail_base: Some("cn=users,ou=gs2,dc=schule,dc=de".to_string()),
            }),
            Arc::new(LocalSyncQueue::new()),
        );

        let stats = syncer.sync(&system).await.unwrap();
        assert!(!stats.success);
        assert_eq!(
            stats.errors,
            vec!["LDAP sync failed for school \"Grundschule Zwei\" (gs2).".to_string()]
        );

        let system = storage.get_system_by_id(system.id).await.unwrap().unwrap();
        assert!(system.last_sync_attempt.is_some());
        assert!(system.last_successful_full_sync.is_none());
    }
}
