use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::processor::SyncMessageProcessor;
use super::queue::SyncQueue;

// Redis 多路复用连接带响应超时，单次阻塞读保持在其之下
const RECEIVE_WAIT: Duration = Duration::from_millis(400);
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// 启动后台消费任务，逐条处理同步消息
pub fn spawn_sync_consumer(
    queue: Arc<dyn SyncQueue>,
    processor: SyncMessageProcessor,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Sync consumer started");
        loop {
            match queue.receive(RECEIVE_WAIT).await {
                Ok(Some(message)) => {
                    if let Err(e) = processor.process(&message).await {
                        error!("Sync message '{}' failed: {}", message.action(), e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to read from sync queue: {}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    })
}
