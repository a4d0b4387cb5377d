// ==========================================
// 易腐库存处置系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::disposition_config_trait::DispositionConfigReader;
use crate::domain::types::DEFAULT_WASTE_REASON;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const CANDIDATE_HORIZON_DAYS: &str = "candidate_horizon_days";
    pub const CONFLICT_MAX_RETRIES: &str = "conflict_max_retries";
    pub const CONFLICT_RETRY_BACKOFF_MS: &str = "conflict_retry_backoff_ms";
    pub const WASTE_REASON: &str = "waste_reason";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（upsert）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取全部配置（键有序）
    pub fn list_configs(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv")?;
        let configs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(configs)
    }

    /// 读取并解析数值配置，缺失或格式错误时使用默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// DispositionConfigReader Trait 实现
// ==========================================
#[async_trait]
impl DispositionConfigReader for ConfigManager {
    async fn get_candidate_horizon_days(&self) -> RepositoryResult<u32> {
        self.get_parsed_or_default(config_keys::CANDIDATE_HORIZON_DAYS, 3)
    }

    async fn get_conflict_max_retries(&self) -> RepositoryResult<u32> {
        self.get_parsed_or_default(config_keys::CONFLICT_MAX_RETRIES, 3)
    }

    async fn get_conflict_retry_backoff_ms(&self) -> RepositoryResult<u64> {
        self.get_parsed_or_default(config_keys::CONFLICT_RETRY_BACKOFF_MS, 50)
    }

    async fn get_waste_reason(&self) -> RepositoryResult<String> {
        let reason = self
            .get_config_value(config_keys::WASTE_REASON)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_WASTE_REASON.to_string());
        Ok(reason)
    }
}
