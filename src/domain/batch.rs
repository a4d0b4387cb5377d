// ==========================================
// 易腐库存处置系统 - 批次领域模型
// ==========================================
// 对齐: batch 表
// 红线: quantity >= 0；expiry_date 创建后不可变
// ==========================================

use crate::domain::types::BatchStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Batch - 库存批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: i64,
    pub product_id: i64,             // 外部商品目录引用
    pub quantity: i64,               // 当前可处置数量
    pub original_quantity: i64,      // 入库数量（不可变）
    pub expiry_date: NaiveDate,
    pub status: BatchStatus,
    pub received_at: NaiveDateTime,
}

impl Batch {
    /// 相对参考日期是否已过期（严格小于）
    pub fn is_expired_on(&self, reference_date: NaiveDate) -> bool {
        self.expiry_date < reference_date
    }

    /// 距离过期的天数（已过期为负数）
    pub fn days_left(&self, reference_date: NaiveDate) -> i64 {
        (self.expiry_date - reference_date).num_days()
    }
}

// ==========================================
// NewBatch - 入库批次（仅用于收货/初始化数据）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBatch {
    pub product_id: i64,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub received_at: NaiveDateTime,
}

// ==========================================
// CandidateView - 捐赠候选视图（只读投影）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateView {
    pub batch_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>, // 商品目录未收录时为 None
    pub category_id: Option<i64>,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub days_left: i64,
}
