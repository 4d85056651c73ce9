//! 通过注册链接完成账户注册
//!
//! 用户记录由管理员或同步预先创建，注册只补全资料并创建登录账户。

use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::registration::{
    requests::{ParentRecord, RegistrationRecord, RegistrationRequest},
    responses::{RegistrationPrefill, RegistrationResponse},
};
use crate::models::users::entities::User;
use crate::services::users::admin::EMAIL_EXISTS;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{normalize_email, same_email, validate_email};

use super::pin::verify_pin;

pub const SAME_PARENT_EMAIL: &str =
    "Bitte gib eine unterschiedliche E-Mail-Adresse für dein Kind an.";
pub const ROLE_NOT_ALLOWED: &str = "You are not allowed to register!";
pub const WRONG_PIN: &str =
    "Der eingegebene Code konnte leider nicht verfiziert werden. Versuch es doch noch einmal.";
pub const ACCOUNT_FAILED: &str = "Fehler beim Erstellen des Accounts.";

async fn user_by_import_hash(storage: &Arc<dyn Storage>, import_hash: &str) -> Result<User> {
    storage
        .get_user_by_import_hash(import_hash)
        .await?
        .ok_or_else(|| SchulCloudError::not_found("Registration link is not valid"))
}

/// 注册表单预填数据
pub async fn find_by_import_hash(
    storage: &Arc<dyn Storage>,
    import_hash: &str,
) -> Result<RegistrationPrefill> {
    let user = user_by_import_hash(storage, import_hash).await?;
    Ok(RegistrationPrefill {
        user_id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        role: user.role,
    })
}

fn parent_record(req: &RegistrationRequest) -> Option<ParentRecord> {
    req.parent_email().map(|email| ParentRecord {
        first_name: req.parent_first_name.clone().unwrap_or_default(),
        last_name: req.parent_last_name.clone().unwrap_or_default(),
        email: normalize_email(email),
    })
}

/// 校验并在单个事务内完成注册，任一步失败用户记录保持原样
pub async fn register(
    storage: &Arc<dyn Storage>,
    req: RegistrationRequest,
) -> Result<RegistrationResponse> {
    if let Some(parent_email) = req.parent_email()
        && same_email(parent_email, &req.email)
    {
        return Err(SchulCloudError::bad_request(SAME_PARENT_EMAIL));
    }

    let user = user_by_import_hash(storage, &req.import_hash).await?;
    if !user.role.can_register() {
        return Err(SchulCloudError::bad_request(ROLE_NOT_ALLOWED));
    }

    let email = normalize_email(&req.email);
    validate_email(&email).map_err(SchulCloudError::validation)?;

    // 有家长时验证码发往家长邮箱
    let pin_email = req.parent_email().unwrap_or(&email).to_string();
    let pin = verify_pin(storage, &pin_email, &req.pin)
        .await?
        .ok_or_else(|| SchulCloudError::bad_request(WRONG_PIN))?;

    if let Some(existing) = storage.get_user_by_email(&email).await?
        && existing.id != user.id
    {
        return Err(SchulCloudError::bad_request(EMAIL_EXISTS));
    }

    let password = match (req.password_1.as_deref(), req.password_2.as_deref()) {
        (Some(p1), Some(p2)) if !p1.is_empty() && p1 == p2 => p1,
        _ => return Err(SchulCloudError::bad_request(ACCOUNT_FAILED)),
    };
    let password_hash = hash_password(password)?;

    let record = RegistrationRecord {
        user_id: user.id,
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        email,
        birthday: req.birthday,
        password_hash,
        parent: parent_record(&req),
        user_privacy_consent: req.privacy_consent,
        user_terms_consent: req.terms_of_use_consent,
        pin_id: pin.id,
    };

    let response = storage.complete_registration(record).await.map_err(|e| {
        tracing::error!("Registration of user {} failed: {}", user.id, e);
        SchulCloudError::bad_request(ACCOUNT_FAILED)
    })?;

    tracing::info!("User {} completed registration", response.user.id);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::UpdateUserRequest;
    use crate::services::registration::pin::create_pin;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    async fn invited(role: UserRole) -> (Arc<dyn Storage>, User) {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let user = seed_user(&storage, school_id, "import@gym.de", role).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        storage
            .update_user(
                user.id,
                UpdateUserRequest {
                    import_hash: Some(Some("abc123".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (storage, user)
    }

    fn request(pin: &str) -> RegistrationRequest {
        RegistrationRequest {
            import_hash: "abc123".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Schmidt".to_string(),
            email: "Anna@Gym.de".to_string(),
            password_1: Some("Geheim123".to_string()),
            password_2: Some("Geheim123".to_string()),
            pin: pin.to_string(),
            privacy_consent: true,
            terms_of_use_consent: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_student() {
        let (storage, user) = invited(UserRole::Student).await;
        let pin = create_pin(&storage, "anna@gym.de", true).await.unwrap();

        let prefill = find_by_import_hash(&storage, "abc123").await.unwrap();
        assert_eq!(prefill.user_id, user.id);

        let response = register(&storage, request(&pin.pin)).await.unwrap();
        assert_eq!(response.user.email, "anna@gym.de");
        assert!(response.user.import_hash.is_none());
        assert_eq!(response.account.username, "anna@gym.de");
        assert!(response.consent.user_privacy_consent);
        assert!(response.parents.is_empty());

        // 注册码已核销
        let err = register(&storage, request(&pin.pin)).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_register_rejects_wrong_pin_and_passwords() {
        let (storage, user) = invited(UserRole::Student).await;
        let pin = create_pin(&storage, "anna@gym.de", true).await.unwrap();
        let wrong = if pin.pin == "0000" { "1111" } else { "0000" };

        let err = register(&storage, request(wrong)).await.unwrap_err();
        assert_eq!(err.message(), WRONG_PIN);

        let mut mismatch = request(&pin.pin);
        mismatch.password_2 = Some("Anders123".to_string());
        let err = register(&storage, mismatch).await.unwrap_err();
        assert_eq!(err.message(), ACCOUNT_FAILED);

        let unchanged = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "import@gym.de");
        assert!(storage.get_account_by_user_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_with_parent() {
        let (storage, _) = invited(UserRole::Student).await;

        let mut same = request("0000");
        same.parent_email = Some("ANNA@gym.de".to_string());
        let err = register(&storage, same).await.unwrap_err();
        assert_eq!(err.message(), SAME_PARENT_EMAIL);

        let pin = create_pin(&storage, "mutter@web.de", true).await.unwrap();
        let mut req = request(&pin.pin);
        req.parent_email = Some("mutter@web.de".to_string());
        req.parent_first_name = Some("Maria".to_string());
        req.parent_last_name = Some("Schmidt".to_string());

        let response = register(&storage, req).await.unwrap();
        assert_eq!(response.parents.len(), 1);
        assert_eq!(response.consent.parent_privacy_consent, Some(true));
    }

    #[tokio::test]
    async fn test_parent_role_cannot_register() {
        let (storage, _) = invited(UserRole::Parent).await;
        let pin = create_pin(&storage, "anna@gym.de", true).await.unwrap();
        let err = register(&storage, request(&pin.pin)).await.unwrap_err();
        assert_eq!(err.message(), ROLE_NOT_ALLOWED);
    }
}
