//! 运行级取消信号
//!
//! 用户中断或 fail-fast 模式下由任意一方触发，所有等待方都会收到

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// 等待取消；已取消时立即返回
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // 发送端由 self 持有，wait_for 不会因通道关闭而返回错误
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
