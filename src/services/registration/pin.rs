use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::registration::responses::RegistrationPin;
use crate::storage::Storage;
use crate::utils::random_code::generate_pin;
use crate::utils::validate::validate_email;

/// 为邮箱生成新的 4 位注册码
///
/// 邮件发送由外部服务负责，这里只记录日志。
pub async fn create_pin(
    storage: &Arc<dyn Storage>,
    email: &str,
    silent: bool,
) -> Result<RegistrationPin> {
    validate_email(email).map_err(SchulCloudError::validation)?;
    let pin = storage.create_registration_pin(email, &generate_pin()).await?;
    if !silent {
        tracing::info!("Registration pin {} issued for {}", pin.id, pin.email);
    }
    Ok(pin)
}

/// 与该邮箱最近一次生成且未使用的注册码比对
pub async fn verify_pin(
    storage: &Arc<dyn Storage>,
    email: &str,
    pin: &str,
) -> Result<Option<RegistrationPin>> {
    Ok(storage
        .get_latest_registration_pin(email)
        .await?
        .filter(|latest| !latest.verified && latest.pin == pin.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_only_latest_pin_is_valid() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());

        let first = create_pin(&storage, "Anna@Gym.de", true).await.unwrap();
        let second = create_pin(&storage, "anna@gym.de", false).await.unwrap();
        assert_eq!(second.email, "anna@gym.de");

        let found = verify_pin(&storage, "anna@gym.de", &second.pin).await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(second.id));

        if first.pin != second.pin {
            assert!(verify_pin(&storage, "anna@gym.de", &first.pin).await.unwrap().is_none());
        }
        assert!(create_pin(&storage, "keine-mail", true).await.is_err());
    }
}
