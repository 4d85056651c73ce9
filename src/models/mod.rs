pub mod auth;
pub mod common;
pub mod files;
pub mod groups;
pub mod news;
pub mod registration;
pub mod schools;
pub mod sync;
pub mod system;
pub mod tasks;
pub mod users;
pub mod wopi;

pub use common::{ApiResponse, ErrorCode, PaginatedResponse, PaginationInfo, PaginationQuery};
