use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::{Mutex, OnceCell, mpsc};
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};
use crate::models::sync::entities::SyncMessage;

/// 同步消息队列
#[async_trait]
pub trait SyncQueue: Send + Sync {
    async fn publish(&self, message: &SyncMessage) -> Result<()>;

    /// 最多等待 `wait`，无消息时返回 None
    async fn receive(&self, wait: Duration) -> Result<Option<SyncMessage>>;
}

/// 进程内队列
pub struct LocalSyncQueue {
    sender: mpsc::UnboundedSender<SyncMessage>,
    receiver: Mutex<mpsc::UnboundedReceiver<SyncMessage>>,
}

impl LocalSyncQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }
}

impl Default for LocalSyncQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncQueue for LocalSyncQueue {
    async fn publish(&self, message: &SyncMessage) -> Result<()> {
        self.sender
            .send(message.clone())
            .map_err(|e| SchulCloudError::queue(format!("Local sync queue closed: {e}")))
    }

    async fn receive(&self, wait: Duration) -> Result<Option<SyncMessage>> {
        let mut receiver = self.receiver.lock().await;
        match tokio::time::timeout(wait, receiver.recv()).await {
            Ok(Some(message)) => Ok(Some(message)),
            Ok(None) => Err(SchulCloudError::queue("Local sync queue closed")),
            Err(_) => Ok(None),
        }
    }
}

/// Redis 列表队列：RPUSH 入队，BLPOP 出队
pub struct RedisSyncQueue {
    client: redis::Client,
    publisher: OnceCell<MultiplexedConnection>,
    consumer: OnceCell<MultiplexedConnection>,
    key: String,
}

impl RedisSyncQueue {
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            publisher: OnceCell::new(),
            consumer: OnceCell::new(),
            key: key.to_string(),
        })
    }

    // 出队走独立连接，阻塞读不影响入队
    async fn connection(
        &self,
        cell: &OnceCell<MultiplexedConnection>,
    ) -> Result<MultiplexedConnection> {
        let conn = cell
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl SyncQueue for RedisSyncQueue {
    async fn publish(&self, message: &SyncMessage) -> Result<()> {
        let payload = serde_json::to_string(message)?;
        let mut conn = self.connection(&self.publisher).await?;
        conn.rpush::<_, _, i64>(&self.key, payload).await?;
        Ok(())
    }

    async fn receive(&self, wait: Duration) -> Result<Option<SyncMessage>> {
        let mut conn = self.connection(&self.consumer).await?;
        let popped: Option<(String, String)> = conn.blpop(&self.key, wait.as_secs_f64()).await?;

        match popped {
            Some((_, payload)) => match serde_json::from_str(&payload) {
                Ok(message) => Ok(Some(message)),
                Err(e) => {
                    error!("Dropping malformed sync message: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}

/// 按配置创建队列，Redis 不可用时回退到进程内队列
pub fn create_sync_queue() -> Arc<dyn SyncQueue> {
    let config = AppConfig::get();

    if config.sync.queue == "redis" {
        match RedisSyncQueue::new(&config.cache.redis.url, &config.sync.queue_key) {
            Ok(queue) => {
                debug!("Using Redis sync queue '{}'", config.sync.queue_key);
                return Arc::new(queue);
            }
            Err(e) => warn!("Failed to create Redis sync queue: {}, using local queue", e),
        }
    }

    Arc::new(LocalSyncQueue::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sync::entities::LdapSchool;

    #[tokio::test]
    async fn test_local_queue_is_fifo() {
        let queue = LocalSyncQueue::new();
        for ou in ["gym1", "gym2"] {
            queue
                .publish(&SyncMessage::SyncSchool {
                    system_id: 1,
                    school: LdapSchool {
                        ldap_ou: ou.to_string(),
                        display_name: ou.to_uppercase(),
                    },
                })
                .await
                .unwrap();
        }

        let wait = Duration::from_millis(50);
        let first = queue.receive(wait).await.unwrap().unwrap();
        let second = queue.receive(wait).await.unwrap().unwrap();
        assert!(matches!(first, SyncMessage::SyncSchool { school, .. } if school.ldap_ou == "gym1"));
        assert!(matches!(second, SyncMessage::SyncSchool { school, .. } if school.ldap_ou == "gym2"));
        assert!(queue.receive(wait).await.unwrap().is_none());
    }
}
