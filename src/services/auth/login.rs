use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};
use crate::models::auth::{requests::LoginRequest, responses::LoginResponse};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;
use crate::utils::validate::normalize_email;

use super::whitelist;

const INVALID_CREDENTIALS: &str = "Username or password is incorrect";

/// 登录成功后的响应与 refresh token
pub struct LoginOutcome {
    pub response: LoginResponse,
    pub refresh_token: String,
}

pub async fn login(
    storage: &Arc<dyn Storage>,
    cache: &Arc<dyn ObjectCache>,
    req: LoginRequest,
) -> Result<LoginOutcome> {
    let account = storage
        .get_account_by_username(&normalize_email(&req.username))
        .await?
        .ok_or_else(|| SchulCloudError::authentication(INVALID_CREDENTIALS))?;

    let password_ok = account
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !password_ok {
        return Err(SchulCloudError::authentication(INVALID_CREDENTIALS));
    }
    if !account.activated {
        return Err(SchulCloudError::authentication("Account is not activated"));
    }

    let user = storage
        .get_user_by_id(account.user_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| SchulCloudError::authentication(INVALID_CREDENTIALS))?;

    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login of user {}: {}", user.id, e);
    }

    let pair = JwtUtils::generate_token_pair(user.id, user.role.as_str(), user.school_id)
        .map_err(|e| SchulCloudError::general(format!("Failed to generate token: {e}")))?;
    whitelist::register(cache, user.id, &pair.jti).await;

    tracing::info!("User {} logged in", user.id);

    Ok(LoginOutcome {
        response: LoginResponse {
            access_token: pair.access_token,
            expires_in: AppConfig::get().jwt.access_token_expiry * 60,
            user,
            created_at: chrono::Utc::now(),
        },
        refresh_token: pair.refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user_with_account};
    use crate::utils::jwt::JwtUtils;
    use crate::utils::password::hash_password;

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_whitelists_token() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let hash = hash_password("Geheim123").unwrap();
        let user = seed_user_with_account(
            &storage,
            school_id,
            "anna@gym.de",
            UserRole::Student,
            Some(hash),
        )
        .await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));

        let outcome = login(&storage, &cache, login_request("Anna@Gym.de", "Geheim123"))
            .await
            .unwrap();
        assert_eq!(outcome.response.user.id, user.id);

        let claims = JwtUtils::verify_access_token(&outcome.response.access_token).unwrap();
        assert!(whitelist::remaining(&cache, &claims.whitelist_key()).await.is_some());

        let account = storage.get_account_by_user_id(user.id).await.unwrap().unwrap();
        assert!(account.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let hash = hash_password("Geheim123").unwrap();
        seed_user_with_account(&storage, school_id, "anna@gym.de", UserRole::Student, Some(hash))
            .await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));

        let err = login(&storage, &cache, login_request("anna@gym.de", "falsch"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.message(), INVALID_CREDENTIALS);

        let err = login(&storage, &cache, login_request("niemand@gym.de", "Geheim123"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status().as_u16(), 401);
    }
}
