// ==========================================
// 易腐库存处置系统 - 处置配置读取 Trait
// ==========================================
// 职责: 定义引擎层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// DispositionConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DispositionConfigReader: Send + Sync {
    /// 捐赠候选的默认时间窗口（天）
    ///
    /// # 默认值
    /// - 3
    async fn get_candidate_horizon_days(&self) -> RepositoryResult<u32>;

    /// 事务冲突的最大重试次数
    ///
    /// # 默认值
    /// - 3
    async fn get_conflict_max_retries(&self) -> RepositoryResult<u32>;

    /// 事务冲突重试退避（毫秒）
    ///
    /// # 默认值
    /// - 50
    async fn get_conflict_retry_backoff_ms(&self) -> RepositoryResult<u64>;

    /// 过期清理写入报废日志的原因
    ///
    /// # 默认值
    /// - "expired"
    async fn get_waste_reason(&self) -> RepositoryResult<String>;
}
