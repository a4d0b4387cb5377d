// ==========================================
// 易腐库存处置系统 - 领域模型层
// ==========================================
// 职责: 定义批次、处置日志、视图等领域实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod batch;
pub mod disposition;
pub mod types;

// 重导出核心类型
pub use batch::{Batch, CandidateView, NewBatch};
pub use disposition::{
    DispositionEvent, DonationReceipt, DonationRecord, SweepSummary, WasteRecord,
};
pub use types::{BatchStatus, DEFAULT_WASTE_REASON};
