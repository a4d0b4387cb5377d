// ==========================================
// 易腐库存处置系统 - API 层
// ==========================================
// 职责: 操作端命令入口（捐赠、过期清理、候选查询、历史、审计）
// ==========================================

pub mod disposition_api;
pub mod response;

// 重导出核心类型
pub use disposition_api::DispositionApi;
pub use response::{CommandResponse, ErrorDetail, ResponseStatus};
