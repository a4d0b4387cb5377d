// ==========================================
// 易腐库存处置系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 批次处置核心（捐赠分配 / 过期清理 / 候选查询）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 处置规则
pub mod engine;

// 外部目录 - 只读查询
pub mod directory;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建库）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 命令入口
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Batch, BatchStatus, CandidateView, DispositionEvent, DonationReceipt, DonationRecord,
    NewBatch, SweepSummary, WasteRecord,
};

// 引擎
pub use engine::{
    CandidateQuery, DispositionError, DispositionResult, DonationAllocator, ExpirySweeper,
    InvariantAuditor,
};

// API
pub use api::{CommandResponse, DispositionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
