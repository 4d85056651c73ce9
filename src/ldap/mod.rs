//! 目录服务访问
//!
//! - `strategy`: 各目录类型的查询定义与条目映射
//! - `client`: 基于 ldap3 的目录客户端
//! - `group_update`: Univention 全局组更新

pub mod client;
pub mod group_update;
pub mod strategy;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::schools::entities::LdapSystem;

pub use client::Ldap3Client;
pub use group_update::{GroupUpdateOutcome, UniventionGroupUpdater};
pub use strategy::{LdapStrategy, UniventionStrategy, strategy_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Base,
    One,
    Sub,
}

/// 一次目录搜索
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub base: String,
    pub scope: SearchScope,
    pub filter: String,
    /// 为空时返回全部属性
    pub attributes: Vec<String>,
}

/// 目录返回的条目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, values: &[&str]) -> Self {
        self.attrs.insert(
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// 属性的第一个非空值
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .and_then(|values| values.iter().find(|v| !v.is_empty()))
            .map(String::as_str)
    }

    pub fn all(&self, name: &str) -> &[String] {
        self.attrs.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// 目录客户端
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn search(&self, system: &LdapSystem, query: &SearchQuery)
    -> Result<Vec<DirectoryEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_first_skips_empty_values() {
        let entry = DirectoryEntry::new("uid=max,cn=users")
            .with_attr("mail", &["", "max@schule.de"])
            .with_attr("objectClass", &["person", "ucsschoolStudent"]);

        assert_eq!(entry.first("mail"), Some("max@schule.de"));
        assert_eq!(entry.first("sn"), None);
        assert_eq!(entry.all("objectClass").len(), 2);
        assert!(entry.all("memberOf").is_empty());
    }
}
