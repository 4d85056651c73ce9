//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

use chrono::{DateTime, Utc};

pub mod prelude;

pub mod accounts;
pub mod class_users;
pub mod classes;
pub mod consents;
pub mod course_users;
pub mod courses;
pub mod file_permissions;
pub mod files;
pub mod news;
pub mod registration_pins;
pub mod schools;
pub mod submission_files;
pub mod submission_members;
pub mod submissions;
pub mod systems;
pub mod task_archives;
pub mod tasks;
pub mod team_users;
pub mod teams;
pub mod trashbins;
pub mod user_parents;
pub mod users;

/// 秒级时间戳转换为 UTC 时间
pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
