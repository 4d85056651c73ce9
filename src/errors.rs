//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称和 HTTP 状态码。
//! `ResponseError` 实现即全局错误映射层。

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - status() 方法 - 返回 HTTP 状态码
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_schulcloud_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $status:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum SchulCloudError {
            $($variant(String),)*
        }

        impl SchulCloudError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SchulCloudError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SchulCloudError::$variant(_) => $type_name,)*
                }
            }

            /// 变体名，如 `NotFound`
            pub fn variant_name(&self) -> &'static str {
                match self {
                    $(SchulCloudError::$variant(_) => stringify!($variant),)*
                }
            }

            /// 获取 HTTP 状态码
            pub fn status(&self) -> StatusCode {
                match self {
                    $(SchulCloudError::$variant(_) => StatusCode::$status,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SchulCloudError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SchulCloudError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SchulCloudError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_schulcloud_errors! {
    CacheConnection("E001", "Cache Connection Error", INTERNAL_SERVER_ERROR),
    DatabaseConfig("E003", "Database Configuration Error", INTERNAL_SERVER_ERROR),
    DatabaseConnection("E004", "Database Connection Error", INTERNAL_SERVER_ERROR),
    DatabaseOperation("E005", "Database Operation Error", INTERNAL_SERVER_ERROR),
    FileOperation("E006", "File Operation Error", INTERNAL_SERVER_ERROR),
    Validation("E007", "Validation Error", BAD_REQUEST),
    NotFound("E008", "Resource Not Found", NOT_FOUND),
    Serialization("E009", "Serialization Error", INTERNAL_SERVER_ERROR),
    DateParse("E011", "Date Parse Error", BAD_REQUEST),
    Authentication("E012", "Authentication Error", UNAUTHORIZED),
    Authorization("E013", "Authorization Error", FORBIDDEN),
    BadRequest("E014", "Bad Request", BAD_REQUEST),
    Conflict("E015", "Conflict", CONFLICT),
    NotImplemented("E016", "Not Implemented", NOT_IMPLEMENTED),
    Directory("E017", "Directory Error", BAD_GATEWAY),
    ExternalService("E018", "External Service Error", BAD_GATEWAY),
    Queue("E019", "Queue Error", INTERNAL_SERVER_ERROR),
    General("E020", "General Error", INTERNAL_SERVER_ERROR),
}

impl SchulCloudError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 大写下划线形式的类型名，如 `NOT_FOUND`
    pub fn type_key(&self) -> String {
        let name = self.variant_name();
        let mut key = String::with_capacity(name.len() + 4);
        for (i, c) in name.chars().enumerate() {
            if c.is_uppercase() && i > 0 {
                key.push('_');
            }
            key.push(c.to_ascii_uppercase());
        }
        key
    }
}

impl fmt::Display for SchulCloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SchulCloudError {}

/// 错误响应体
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

impl ResponseError for SchulCloudError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let mut detail = ErrorDetail {
            error_type: self.type_key(),
            title: self.error_type().to_string(),
            error_code: self.code().to_string(),
            error_id: None,
        };

        let message = if status.is_server_error() {
            // 未预期错误只返回错误 ID，详情写入日志
            let error_id = uuid::Uuid::new_v4().to_string();
            error!(error_id = %error_id, code = self.code(), "{}", self.format_simple());
            detail.error_id = Some(error_id.clone());
            if AppConfig::get().is_production() {
                format!("Internal error, id: {error_id}")
            } else {
                format!("{} (id: {error_id})", self.message())
            }
        } else {
            info!(code = self.code(), status = status.as_u16(), "{}", self.format_simple());
            self.message().to_string()
        };

        HttpResponse::build(status).json(ApiResponse::error(
            ErrorCode::from_status(status.as_u16()),
            detail,
            message,
        ))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SchulCloudError {
    fn from(err: sea_orm::DbErr) -> Self {
        SchulCloudError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SchulCloudError {
    fn from(err: std::io::Error) -> Self {
        SchulCloudError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SchulCloudError {
    fn from(err: serde_json::Error) -> Self {
        SchulCloudError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for SchulCloudError {
    fn from(err: chrono::ParseError) -> Self {
        SchulCloudError::DateParse(err.to_string())
    }
}

impl From<reqwest::Error> for SchulCloudError {
    fn from(err: reqwest::Error) -> Self {
        SchulCloudError::ExternalService(err.to_string())
    }
}

impl From<ldap3::LdapError> for SchulCloudError {
    fn from(err: ldap3::LdapError) -> Self {
        SchulCloudError::Directory(err.to_string())
    }
}

impl From<redis::RedisError> for SchulCloudError {
    fn from(err: redis::RedisError) -> Self {
        SchulCloudError::Queue(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchulCloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchulCloudError::cache_connection("test").code(), "E001");
        assert_eq!(SchulCloudError::database_config("test").code(), "E003");
        assert_eq!(SchulCloudError::validation("test").code(), "E007");
        assert_eq!(SchulCloudError::authentication("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            SchulCloudError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(SchulCloudError::not_found("x").type_key(), "NOT_FOUND");
        assert_eq!(SchulCloudError::bad_request("x").type_key(), "BAD_REQUEST");
        assert_eq!(
            SchulCloudError::database_operation("x").type_key(),
            "DATABASE_OPERATION"
        );
    }

    #[test]
    fn test_status_taxonomy() {
        assert_eq!(SchulCloudError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(SchulCloudError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(SchulCloudError::authorization("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(SchulCloudError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            SchulCloudError::general("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = SchulCloudError::validation("Invalid URL");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid URL"));
    }

    #[test]
    fn test_server_error_response_status() {
        let response = SchulCloudError::general("boom").error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
