use std::time::Duration;

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::{debug, warn};

use super::{DirectoryClient, DirectoryEntry, SearchQuery, SearchScope};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::schools::entities::LdapSystem;

/// 每次搜索单独建立连接：绑定、搜索、解绑
pub struct Ldap3Client {
    connect_timeout: Duration,
}

impl Ldap3Client {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn from_config() -> Self {
        Self::new(Duration::from_secs(AppConfig::get().ldap.connect_timeout))
    }
}

impl From<SearchScope> for Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::One => Scope::OneLevel,
            SearchScope::Sub => Scope::Subtree,
        }
    }
}

#[async_trait]
impl DirectoryClient for Ldap3Client {
    async fn search(
        &self,
        system: &LdapSystem,
        query: &SearchQuery,
    ) -> Result<Vec<DirectoryEntry>> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.connect_timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &system.url).await?;

        let url = system.url.clone();
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection to {} closed with error: {}", url, e);
            }
        });

        ldap.simple_bind(&system.search_user, &system.search_password)
            .await?
            .success()?;

        let (entries, _) = ldap
            .search(
                &query.base,
                query.scope.into(),
                &query.filter,
                &query.attributes,
            )
            .await?
            .success()?;

        debug!(
            "LDAP search '{}' under '{}' returned {} entries",
            query.filter,
            query.base,
            entries.len()
        );

        if let Err(e) = ldap.unbind().await {
            warn!("LDAP unbind failed: {}", e);
        }

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| DirectoryEntry {
                dn: entry.dn,
                attrs: entry.attrs,
            })
            .collect())
    }
}
