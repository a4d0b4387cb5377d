// ==========================================
// 易腐库存处置系统 - 处置错误类型
// ==========================================
// 约束: 所有校验错误在任何写入之前检测，不留部分效果
// 约束: 仅 TransactionConflict 允许内部有限重试
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 处置操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispositionError {
    #[error("批次不存在: batch_id={batch_id}")]
    BatchNotFound { batch_id: i64 },

    #[error("可处置数量不足: batch_id={batch_id}, requested={requested}, available={available}")]
    InsufficientQuantity {
        batch_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("无效的数量: {quantity}（必须大于0）")]
    InvalidQuantity { quantity: i64 },

    #[error("受赠方不存在: recipient_id={recipient_id}")]
    RecipientNotFound { recipient_id: i64 },

    #[error("事务冲突（可重试）: {0}")]
    TransactionConflict(String),

    #[error("存储不可用: {0}")]
    StorageFailure(String),
}

impl DispositionError {
    /// 稳定的错误码（供操作端结构化输出）
    pub fn code(&self) -> &'static str {
        match self {
            DispositionError::BatchNotFound { .. } => "BATCH_NOT_FOUND",
            DispositionError::InsufficientQuantity { .. } => "INSUFFICIENT_QUANTITY",
            DispositionError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            DispositionError::RecipientNotFound { .. } => "RECIPIENT_NOT_FOUND",
            DispositionError::TransactionConflict(_) => "TRANSACTION_CONFLICT",
            DispositionError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DispositionError::TransactionConflict(_))
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for DispositionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TransactionConflict(msg) => DispositionError::TransactionConflict(msg),
            RepositoryError::InvalidQuantity { quantity } => {
                DispositionError::InvalidQuantity { quantity }
            }
            other => DispositionError::StorageFailure(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type DispositionResult<T> = Result<T, DispositionError>;
