pub mod auth;
pub mod authorization;
pub mod files;
pub mod news;
pub mod registration;
pub mod sync;
pub mod system;
pub mod tasks;
pub mod users;
pub mod wopi;

pub use auth::AuthService;
pub use files::FileService;
pub use news::NewsService;
pub use registration::RegistrationService;
pub use sync::SyncService;
pub use system::SystemService;
pub use tasks::TaskService;
pub use users::UserService;
pub use wopi::WopiService;

use actix_web::{HttpMessage, HttpRequest};

use crate::errors::{Result, SchulCloudError};
use crate::models::users::entities::User;

/// 取 RequireJWT 写入请求扩展的当前用户
pub(crate) fn current_user(request: &HttpRequest) -> Result<User> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| SchulCloudError::authentication("Not authenticated"))
}
