// ==========================================
// 易腐库存处置系统 - 引擎层
// ==========================================
// 职责: 处置业务规则（捐赠分配、过期清理、候选查询、不变量审计）
// 红线: 写入只能经由 DispositionRepository 的单事务
// ==========================================

pub mod candidate_query;
pub mod disposition_core;
pub mod donation_allocator;
pub mod error;
pub mod expiry_sweeper;
pub mod invariant_audit;
pub mod retry;

// 重导出核心引擎
pub use candidate_query::CandidateQuery;
pub use disposition_core::{DispositionCore, DonationPlan, WastePlan};
pub use donation_allocator::DonationAllocator;
pub use error::{DispositionError, DispositionResult};
pub use expiry_sweeper::ExpirySweeper;
pub use invariant_audit::{AuditReport, InvariantAuditor, InvariantViolation, ViolationKind};
pub use retry::RetryPolicy;
