// ==========================================
// 易腐库存处置系统 - 处置日志领域模型
// ==========================================
// 对齐: donation_log / waste_log 表
// 红线: 日志只追加，写入后不可变
// ==========================================

use crate::domain::types::BatchStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DonationRecord - 捐赠记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub donation_id: i64,
    pub batch_id: i64,
    pub recipient_id: i64,
    pub quantity: i64,             // > 0
    pub donated_at: NaiveDateTime,
}

// ==========================================
// WasteRecord - 报废记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteRecord {
    pub waste_id: i64,
    pub batch_id: i64,
    pub quantity: i64,             // 报废时的剩余数量
    pub reason: String,            // 默认 "expired"
    pub wasted_at: NaiveDateTime,
}

// ==========================================
// DispositionEvent - 统一处置事件流（只读视图）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispositionEvent {
    Donated(DonationRecord),
    Wasted(WasteRecord),
}

impl DispositionEvent {
    pub fn batch_id(&self) -> i64 {
        match self {
            DispositionEvent::Donated(r) => r.batch_id,
            DispositionEvent::Wasted(r) => r.batch_id,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            DispositionEvent::Donated(r) => r.quantity,
            DispositionEvent::Wasted(r) => r.quantity,
        }
    }

    pub fn occurred_at(&self) -> NaiveDateTime {
        match self {
            DispositionEvent::Donated(r) => r.donated_at,
            DispositionEvent::Wasted(r) => r.wasted_at,
        }
    }
}

// ==========================================
// DonationReceipt - 捐赠结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub donation_id: i64,
    pub batch_id: i64,
    pub recipient_id: i64,
    pub donated_quantity: i64,
    pub remaining_quantity: i64,
    pub status: BatchStatus,       // 捐赠后的批次状态
    pub donated_at: NaiveDateTime,
}

// ==========================================
// SweepSummary - 过期清理汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub reference_date: NaiveDate,
    pub batches_wasted: usize,
    pub total_quantity_wasted: i64,
    pub wasted_batch_ids: Vec<i64>, // 按 batch_id 升序
}

impl SweepSummary {
    /// 空清理结果（无匹配批次，同样视为成功）
    pub fn empty(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            batches_wasted: 0,
            total_quantity_wasted: 0,
            wasted_batch_ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batches_wasted == 0
    }
}
