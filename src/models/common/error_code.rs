use serde::{Deserialize, Serialize};

/// 业务响应码
///
/// 0 表示成功，1xxx 为请求类错误，2xxx 为认证授权错误，5xxx 为服务端错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    ValidationFailed = 1001,
    NotFound = 1004,
    Conflict = 1009,
    PayloadTooLarge = 1013,

    Unauthorized = 2001,
    Forbidden = 2003,
    ApiKeyInvalid = 2005,

    InternalServerError = 5000,
    NotImplemented = 5001,
    ExternalServiceError = 5002,
}

impl ErrorCode {
    /// 按 HTTP 状态码归类
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCode::BadRequest,
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            413 => ErrorCode::PayloadTooLarge,
            501 => ErrorCode::NotImplemented,
            502 => ErrorCode::ExternalServiceError,
            _ => ErrorCode::InternalServerError,
        }
    }
}
