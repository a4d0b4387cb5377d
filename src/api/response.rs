// ==========================================
// 易腐库存处置系统 - 操作端结构化响应
// ==========================================
// 约束: 每次调用要么返回成功结果，要么返回具体错误码（无静默失败）
// ==========================================

use crate::engine::error::{DispositionError, DispositionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// 错误详情（按错误类型填充相关字段）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
    pub retryable: bool,
}

impl From<&DispositionError> for ErrorDetail {
    fn from(err: &DispositionError) -> Self {
        let mut detail = ErrorDetail {
            retryable: err.is_retryable(),
            ..Default::default()
        };
        match err {
            DispositionError::BatchNotFound { batch_id } => detail.batch_id = Some(*batch_id),
            DispositionError::InsufficientQuantity {
                batch_id,
                requested,
                available,
            } => {
                detail.batch_id = Some(*batch_id);
                detail.requested = Some(*requested);
                detail.available = Some(*available);
            }
            DispositionError::InvalidQuantity { quantity } => detail.requested = Some(*quantity),
            DispositionError::RecipientNotFound { recipient_id } => {
                detail.recipient_id = Some(*recipient_id)
            }
            DispositionError::TransactionConflict(_) | DispositionError::StorageFailure(_) => {}
        }
        detail
    }
}

/// 命令响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub status: ResponseStatus,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl<T> CommandResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            code: "OK".to_string(),
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn from_error(err: &DispositionError) -> Self {
        Self {
            status: ResponseStatus::Error,
            code: err.code().to_string(),
            message: err.to_string(),
            data: None,
            error: Some(ErrorDetail::from(err)),
        }
    }

    /// 由操作结果构造响应；成功时用 describe 生成提示信息
    pub fn from_result<F>(result: DispositionResult<T>, describe: F) -> Self
    where
        F: FnOnce(&T) -> String,
    {
        match result {
            Ok(data) => {
                let message = describe(&data);
                Self::ok(data, message)
            }
            Err(err) => Self::from_error(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}
