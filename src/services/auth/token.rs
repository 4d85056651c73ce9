use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};
use crate::models::auth::responses::{JwtTimerResponse, RefreshTokenResponse};
use crate::storage::Storage;
use crate::utils::jwt::{Claims, JwtUtils, TokenKind};

use super::whitelist;

const SESSION_EXPIRED: &str = "Login expired or invalid, please login again";

/// 用 refresh token 换取新的 access token，白名单条目随之续期
pub async fn refresh(
    storage: &Arc<dyn Storage>,
    cache: &Arc<dyn ObjectCache>,
    refresh_token: &str,
) -> Result<RefreshTokenResponse> {
    let claims = JwtUtils::verify_refresh_token(refresh_token).map_err(|e| {
        tracing::info!("Refresh token rejected: {}", e);
        SchulCloudError::authentication(SESSION_EXPIRED)
    })?;

    if whitelist::remaining(cache, &claims.whitelist_key()).await.is_none() {
        return Err(SchulCloudError::authentication(SESSION_EXPIRED));
    }

    let user_id = claims
        .user_id()
        .ok_or_else(|| SchulCloudError::authentication(SESSION_EXPIRED))?;
    let user = storage
        .get_user_by_id(user_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| SchulCloudError::authentication(SESSION_EXPIRED))?;

    let access_token =
        JwtUtils::issue(TokenKind::Access, user.id, user.role.as_str(), user.school_id, &claims.jti)
            .map_err(|e| SchulCloudError::general(format!("Failed to generate token: {e}")))?;
    whitelist::register(cache, user.id, &claims.jti).await;

    Ok(RefreshTokenResponse {
        access_token,
        expires_in: AppConfig::get().jwt.access_token_expiry * 60,
    })
}

/// 当前令牌白名单的剩余时间
pub async fn jwt_timer(cache: &Arc<dyn ObjectCache>, claims: &Claims) -> Result<JwtTimerResponse> {
    let ttl = whitelist::remaining(cache, &claims.whitelist_key())
        .await
        .ok_or_else(|| SchulCloudError::authentication(SESSION_EXPIRED))?;
    Ok(JwtTimerResponse { ttl })
}

/// 将白名单有效期重置为配置的超时时间
pub async fn reset_jwt_timer(
    cache: &Arc<dyn ObjectCache>,
    claims: &Claims,
) -> Result<JwtTimerResponse> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| SchulCloudError::authentication(SESSION_EXPIRED))?;
    let entry = whitelist::register(cache, user_id, &claims.jti).await;
    Ok(JwtTimerResponse {
        ttl: entry.expires_at - chrono::Utc::now().timestamp(),
    })
}
