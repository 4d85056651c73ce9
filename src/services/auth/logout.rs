use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::utils::jwt::Claims;

use super::whitelist;

/// 注销当前会话，令牌立即失效
pub async fn logout(cache: &Arc<dyn ObjectCache>, claims: Option<&Claims>) {
    if let Some(claims) = claims {
        whitelist::revoke(cache, &claims.whitelist_key()).await;
        tracing::info!("User {} logged out", claims.sub);
    }
}
