// ==========================================
// 易腐库存处置系统 - 领域类型定义
// ==========================================
// 红线: 批次状态单调，DONATED / WASTED 为终态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 批次状态 (Batch Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Available, // 可处置
    Donated,   // 已全部捐赠
    Wasted,    // 已过期报废
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl BatchStatus {
    /// 从数据库字符串解析状态
    ///
    /// 未知值返回 None，由仓储层转换为数据错误（不做静默默认）。
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AVAILABLE" => Some(BatchStatus::Available),
            "DONATED" => Some(BatchStatus::Donated),
            "WASTED" => Some(BatchStatus::Wasted),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BatchStatus::Available => "AVAILABLE",
            BatchStatus::Donated => "DONATED",
            BatchStatus::Wasted => "WASTED",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BatchStatus::Available)
    }

    /// 状态迁移是否合法（单调：终态不可回到 AVAILABLE，终态之间不可互转）
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        match (self, next) {
            (BatchStatus::Available, _) => true,
            (from, to) => *from == to,
        }
    }
}

/// 默认报废原因
pub const DEFAULT_WASTE_REASON: &str = "expired";
