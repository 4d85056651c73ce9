//! 安全的路径参数提取器
//!
//! 路径参数解析失败时返回统一的 JSON 错误体，而不是 actix 默认的纯文本 404。

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(name: &str, message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(format!("invalid path parameter `{name}`"), response).into()
}

/// 取第一个路径段的名字，若路由没有命名段则为空
fn first_match_name(req: &HttpRequest) -> Option<String> {
    req.match_info()
        .iter()
        .next()
        .map(|(name, _)| name.to_string())
}

macro_rules! define_id_extractor {
    ($name:ident, $param:literal) => {
        /// 路径中的正整数 ID
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                let raw = req
                    .match_info()
                    .get($param)
                    .map(str::to_string)
                    .or_else(|| {
                        first_match_name(req)
                            .and_then(|name| req.match_info().get(&name).map(str::to_string))
                    });

                let result = match raw {
                    Some(raw) => match raw.parse::<i64>() {
                        Ok(id) if id > 0 => Ok($name(id)),
                        _ => Err(bad_path_param(
                            $param,
                            format!("Invalid {}: {raw}", $param),
                        )),
                    },
                    None => Err(bad_path_param($param, format!("Missing {}", $param))),
                };
                ready(result)
            }
        }
    };
}

define_id_extractor!(SafeIDI64, "id");
define_id_extractor!(SafeFileIdI64, "file_id");
define_id_extractor!(SafeSystemIdI64, "system_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_id_is_extracted() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_non_positive_id_is_rejected() {
        let req = TestRequest::default().param("id", "0").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());

        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_file_id_reads_named_segment() {
        let req = TestRequest::default()
            .param("file_id", "7")
            .to_http_request();
        assert_eq!(SafeFileIdI64::extract(&req).await.unwrap().0, 7);
    }
}
