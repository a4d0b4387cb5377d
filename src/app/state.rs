// ==========================================
// 易腐库存处置系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有组件共享同一个 Arc<Mutex<Connection>>
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::DispositionApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::directory::{SqliteProductCatalog, SqliteRecipientDirectory};
use crate::engine::{CandidateQuery, DonationAllocator, ExpirySweeper, InvariantAuditor};
use crate::repository::{
    BatchRepository, DispositionLogRepository, DispositionRepository, RepositoryResult,
};

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    pub conn: Arc<Mutex<Connection>>,

    /// 处置API
    pub disposition_api: Arc<DispositionApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 批次仓储（收货入库/查询）
    pub batch_repo: Arc<BatchRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动建库）
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(&db_path)?;
        init_schema(&conn)?;

        match read_schema_version(&conn)? {
            Some(v) if v > CURRENT_SCHEMA_VERSION => tracing::warn!(
                db_version = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema 版本高于当前程序"
            ),
            _ => {}
        }

        Ok(Self::from_connection(db_path, Arc::new(Mutex::new(conn))))
    }

    /// 从已初始化的连接组装
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Self {
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let batch_repo = Arc::new(BatchRepository::new(conn.clone()));
        let log_repo = Arc::new(DispositionLogRepository::new(conn.clone()));
        let disposition_repo = Arc::new(DispositionRepository::new(conn.clone()));
        let recipients = Arc::new(SqliteRecipientDirectory::new(conn.clone()));
        let catalog = Arc::new(SqliteProductCatalog::new(conn.clone()));

        let allocator = Arc::new(DonationAllocator::new(
            disposition_repo.clone(),
            recipients,
            config_manager.clone(),
        ));
        let sweeper = Arc::new(ExpirySweeper::new(
            disposition_repo.clone(),
            config_manager.clone(),
        ));
        let candidate_query = Arc::new(CandidateQuery::new(
            batch_repo.clone(),
            catalog,
            config_manager.clone(),
        ));
        let auditor = Arc::new(InvariantAuditor::new(disposition_repo));

        let disposition_api = Arc::new(DispositionApi::new(
            allocator,
            sweeper,
            candidate_query,
            auditor,
            batch_repo.clone(),
            log_repo,
        ));

        Self {
            db_path,
            conn,
            disposition_api,
            config_manager,
            batch_repo,
        }
    }
}

/// 默认数据库路径: <用户数据目录>/perishable-disposition/disposition.db
pub fn get_default_db_path() -> String {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("perishable-disposition");
    if let Err(e) = std::fs::create_dir_all(&path) {
        tracing::warn!("创建数据目录失败: {}", e);
    }
    path.push("disposition.db");
    path.to_string_lossy().to_string()
}
