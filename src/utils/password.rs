use crate::config::AppConfig;
use crate::errors::SchulCloudError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

fn argon2_instance() -> Result<Argon2<'static>, SchulCloudError> {
    let config = AppConfig::get();
    let params = Params::new(
        config.argon2.memory_cost,
        config.argon2.time_cost,
        config.argon2.parallelism,
        None,
    )
    .map_err(|e| SchulCloudError::validation(format!("Argon2 参数错误: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 哈希密码
pub fn hash_password(password: &str) -> Result<String, SchulCloudError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2_instance()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SchulCloudError::general(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 验证密码，参数取自哈希串本身
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// 可直接放入 URL 的加盐哈希（注册链接中的导入哈希）
pub fn url_safe_hash(input: &str) -> Result<String, SchulCloudError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2_instance()?
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| SchulCloudError::general(format!("哈希失败: {e}")))?;
    let output = hash
        .hash
        .ok_or_else(|| SchulCloudError::general("哈希结果为空"))?
        .to_string();
    Ok(output.replace('+', "-").replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Test123!").unwrap();
        assert!(verify_password("Test123!", &hash));
        assert!(!verify_password("test123!", &hash));
        assert!(!verify_password("Test123!", "not-a-hash"));
    }

    #[test]
    fn test_url_safe_hash_is_random_and_url_safe() {
        let a = url_safe_hash("max@mustermann.de").unwrap();
        let b = url_safe_hash("max@mustermann.de").unwrap();
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
