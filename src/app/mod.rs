// ==========================================
// 易腐库存处置系统 - 应用层
// ==========================================
// 职责: 组装共享状态（连接、仓储、引擎、API）
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
