// ==========================================
// 易腐库存处置系统 - 事务冲突重试
// ==========================================
// 约束: 只重试 TransactionConflict，次数有上限；其他错误立即返回
// ==========================================

use crate::engine::error::DispositionResult;
use std::time::Duration;
use tracing::warn;

/// 冲突重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 首次执行之外的最大重试次数
    pub max_retries: u32,
    /// 线性退避基数（第 n 次重试前等待 n * backoff）
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_ms: u64) -> Self {
        Self {
            max_retries,
            backoff: Duration::from_millis(backoff_ms),
        }
    }

    /// 执行操作，遇到事务冲突时按策略重试
    pub async fn run<T, F>(&self, operation: &str, mut attempt: F) -> DispositionResult<T>
    where
        F: FnMut() -> DispositionResult<T>,
    {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        operation,
                        retry = retries,
                        max_retries = self.max_retries,
                        error = %err,
                        "事务冲突，准备重试"
                    );
                    tokio::time::sleep(self.backoff * retries).await;
                }
                result => return result,
            }
        }
    }
}
