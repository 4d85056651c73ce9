use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const REFRESH_COOKIE: &str = "refresh_token";
const AUDIENCE: &str = "schul-cloud";

/// access 与 refresh token 共用一个 jti，对应同一条白名单
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn lifetime(&self) -> chrono::Duration {
        let config = &AppConfig::get().jwt;
        match self {
            TokenKind::Access => chrono::Duration::minutes(config.access_token_expiry),
            TokenKind::Refresh => chrono::Duration::days(config.refresh_token_expiry),
        }
    }
}

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // 用户 ID
    pub role: String,       // 用户角色
    pub school_id: i64,     // 所属学校
    pub jti: String,        // token ID，对应白名单条目
    pub token_type: String, // "access" 或 "refresh"
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// 白名单缓存键
    pub fn whitelist_key(&self) -> String {
        whitelist_key(&self.sub, &self.jti)
    }
}

pub fn whitelist_key(user_id: &str, jti: &str) -> String {
    format!("jwt:{user_id}:{jti}")
}

// Token 对
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub jti: String,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    pub fn issue(
        kind: TokenKind,
        user_id: i64,
        role: &str,
        school_id: i64,
        jti: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            school_id,
            jti: jti.to_string(),
            token_type: kind.as_str().to_string(),
            aud: AUDIENCE.to_string(),
            exp: (now + kind.lifetime()).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Self::secret().as_ref()),
        )
    }

    /// 生成 access/refresh token 对，两者共用同一个 jti
    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        school_id: i64,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let jti = uuid::Uuid::new_v4().to_string();
        let access_token = Self::issue(TokenKind::Access, user_id, role, school_id, &jti)?;
        let refresh_token = Self::issue(TokenKind::Refresh, user_id, role, school_id, &jti)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            jti,
        })
    }

    /// 校验签名、有效期、受众与 token 类型
    pub fn verify(token: &str, kind: TokenKind) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_audience(&[AUDIENCE]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(Self::secret().as_ref()),
            &validation,
        )?
        .claims;

        if claims.token_type != kind.as_str() {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify(token, TokenKind::Refresh)
    }

    fn refresh_cookie(value: String, max_age: actix_web::cookie::time::Duration) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, value)
            .path("/")
            .max_age(max_age)
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    pub fn create_refresh_token_cookie(refresh_token: &str) -> Cookie<'static> {
        Self::refresh_cookie(
            refresh_token.to_string(),
            actix_web::cookie::time::Duration::days(AppConfig::get().jwt.refresh_token_expiry),
        )
    }

    /// 注销时下发的过期 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Self::refresh_cookie(String::new(), actix_web::cookie::time::Duration::ZERO)
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_shares_jti() {
        let pair = JwtUtils::generate_token_pair(7, "teacher", 3).unwrap();
        let access = JwtUtils::verify_access_token(&pair.access_token).unwrap();
        let refresh = JwtUtils::verify_refresh_token(&pair.refresh_token).unwrap();

        assert_eq!(access.jti, pair.jti);
        assert_eq!(refresh.jti, pair.jti);
        assert_eq!(access.user_id(), Some(7));
        assert_eq!(access.school_id, 3);
        assert_eq!(access.whitelist_key(), format!("jwt:7:{}", pair.jti));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let pair = JwtUtils::generate_token_pair(1, "student", 1).unwrap();
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
    }
}
