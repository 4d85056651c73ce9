pub mod auth;

pub mod registration;

pub mod users;

pub mod news;

pub mod tasks;

pub mod files;

pub mod wopi;

pub mod sync;

pub mod system;

pub use auth::configure_auth_routes;
pub use files::configure_file_routes;
pub use news::configure_news_routes;
pub use registration::configure_registration_routes;
pub use sync::configure_sync_routes;
pub use system::configure_system_routes;
pub use tasks::configure_task_routes;
pub use users::configure_user_routes;
pub use wopi::configure_wopi_routes;
