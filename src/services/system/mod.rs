use actix_web::{HttpResponse, Result as ActixResult};
use chrono::Utc;

use crate::models::system::responses::{HaproxyResponse, PingResponse};

/// 存活探测，不访问存储
pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub fn ping(&self) -> PingResponse {
        PingResponse {
            message: "pong",
            timestamp: Utc::now(),
        }
    }

    pub fn haproxy(&self) -> HaproxyResponse {
        HaproxyResponse {
            timestamp: Utc::now(),
        }
    }

    pub async fn get_ping(&self) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(self.ping()))
    }

    pub async fn get_haproxy(&self) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(self.haproxy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_payload() {
        let value = serde_json::to_value(SystemService::new_lazy().ping()).unwrap();
        assert_eq!(value["message"], "pong");
        assert!(value["timestamp"].is_string());
    }
}
