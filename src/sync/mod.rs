//! LDAP 同步
//!
//! `LdapSyncer` 读取目录并把学校、用户、班级作为消息入队，
//! 后台消费者再由 `SyncMessageProcessor` 逐条写入数据库。

pub mod consumer;
pub mod processor;
pub mod queue;
pub mod syncer;

pub use consumer::spawn_sync_consumer;
pub use processor::SyncMessageProcessor;
pub use queue::{LocalSyncQueue, RedisSyncQueue, SyncQueue, create_sync_queue};
pub use syncer::LdapSyncer;
