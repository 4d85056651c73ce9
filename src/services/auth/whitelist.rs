//! JWT 白名单
//!
//! 每个登录会话以 `jwt:{user_id}:{jti}` 记录一条白名单，过期或被移除后令牌即失效。

use std::sync::Arc;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::auth::responses::JwtWhitelistEntry;
use crate::utils::jwt::whitelist_key;

/// 写入或重置白名单条目
pub async fn register(cache: &Arc<dyn ObjectCache>, user_id: i64, jti: &str) -> JwtWhitelistEntry {
    let timeout = AppConfig::get().jwt.whitelist_timeout;
    let entry = JwtWhitelistEntry {
        user_id,
        expires_at: chrono::Utc::now().timestamp() + timeout as i64,
    };
    cache
        .insert(whitelist_key(&user_id.to_string(), jti), &entry, timeout)
        .await;
    entry
}

/// 剩余有效秒数，条目不存在或已过期时为 None
pub async fn remaining(cache: &Arc<dyn ObjectCache>, key: &str) -> Option<i64> {
    match cache.get::<JwtWhitelistEntry>(key).await {
        CacheResult::Found(entry) => {
            let ttl = entry.expires_at - chrono::Utc::now().timestamp();
            (ttl > 0).then_some(ttl)
        }
        _ => None,
    }
}

pub async fn revoke(cache: &Arc<dyn ObjectCache>, key: &str) {
    cache.remove(key).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;

    #[tokio::test]
    async fn test_register_and_revoke() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        let entry = register(&cache, 5, "abc").await;
        assert_eq!(entry.user_id, 5);

        let key = whitelist_key("5", "abc");
        let ttl = remaining(&cache, &key).await.unwrap();
        assert!(ttl > 0 && ttl <= AppConfig::get().jwt.whitelist_timeout as i64);

        revoke(&cache, &key).await;
        assert!(remaining(&cache, &key).await.is_none());
        assert!(remaining(&cache, "jwt:5:other").await.is_none());
    }
}
