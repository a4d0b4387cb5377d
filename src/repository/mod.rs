// ==========================================
// 易腐库存处置系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod batch_repo;
mod convert;
pub mod disposition_log_repo;
pub mod disposition_repo;
pub mod error;

// 重导出核心仓储
pub use batch_repo::BatchRepository;
pub use disposition_log_repo::DispositionLogRepository;
pub use disposition_repo::{DispositionRepository, DispositionTx};
pub use error::{RepositoryError, RepositoryResult};
