// ==========================================
// 易腐库存处置系统 - 处置事务仓储
// ==========================================
// 红线: 日志追加 + 批次数量/状态变更必须在同一事务中提交
// 红线: Repository 不含业务逻辑（校验与决策由 engine 层在事务闭包内完成）
// ==========================================
// 并发: BEGIN IMMEDIATE 在读取前获取写锁，读-校验-写不会与其他写者交错；
//       锁等待受 busy_timeout 限制，超时映射为 TransactionConflict
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::types::BatchStatus;
use crate::repository::batch_repo::{map_batch_row, BATCH_COLUMNS};
use crate::repository::convert::{format_date, format_timestamp};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// DispositionRepository - 处置事务入口
// ==========================================
pub struct DispositionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DispositionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在单个写事务中执行处置操作
    ///
    /// # 说明
    /// - 闭包返回 Ok 时提交；返回 Err 时事务随 drop 回滚，不留任何部分写入
    /// - 错误类型由调用方决定，只需可由 RepositoryError 转换
    pub fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&DispositionTx<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.with_transaction(TransactionBehavior::Immediate, f)
    }

    /// 在单个读事务中读取一致快照
    ///
    /// # 说明
    /// - 多次读取看到同一时刻的批次与日志，不会夹杂并发提交的处置
    /// - 快照期间不应调用写入原语
    pub fn read_snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&DispositionTx<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.with_transaction(TransactionBehavior::Deferred, f)
    }

    fn with_transaction<T, E, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T, E>
    where
        F: FnOnce(&DispositionTx<'_>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(RepositoryError::from)?;

        let result = f(&DispositionTx { conn: &tx })?;

        tx.commit().map_err(RepositoryError::from)?;
        Ok(result)
    }
}

// ==========================================
// DispositionTx - 事务内可用的读写原语
// ==========================================
pub struct DispositionTx<'a> {
    conn: &'a Connection,
}

impl DispositionTx<'_> {
    /// 读取批次（事务内快照）
    pub fn fetch_batch(&self, batch_id: i64) -> RepositoryResult<Option<Batch>> {
        let sql = format!("SELECT {} FROM batch WHERE batch_id = ?1", BATCH_COLUMNS);
        let batch = self
            .conn
            .query_row(&sql, params![batch_id], map_batch_row)
            .optional()?;
        Ok(batch)
    }

    /// 读取全部批次（batch_id 升序）
    pub fn list_batches(&self) -> RepositoryResult<Vec<Batch>> {
        let sql = format!("SELECT {} FROM batch ORDER BY batch_id", BATCH_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let batches = stmt
            .query_map([], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// 按批次汇总已捐赠数量
    pub fn donated_totals(&self) -> RepositoryResult<HashMap<i64, i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT batch_id, SUM(quantity) FROM donation_log GROUP BY batch_id")?;
        let totals = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(totals)
    }

    /// 按批次统计报废记录条数
    pub fn waste_counts(&self) -> RepositoryResult<HashMap<i64, i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT batch_id, COUNT(*) FROM waste_log GROUP BY batch_id")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(counts)
    }

    /// 读取参考日期前已过期的可处置批次（batch_id 升序）
    pub fn fetch_expired_available(
        &self,
        reference_date: NaiveDate,
    ) -> RepositoryResult<Vec<Batch>> {
        let sql = format!(
            r#"SELECT {}
               FROM batch
               WHERE status = 'AVAILABLE' AND expiry_date < ?1
               ORDER BY batch_id"#,
            BATCH_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![format_date(reference_date)], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// 追加捐赠记录
    ///
    /// # 返回
    /// - Ok(donation_id)
    pub fn append_donation(
        &self,
        batch_id: i64,
        recipient_id: i64,
        quantity: i64,
        donated_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO donation_log (batch_id, recipient_id, quantity, donated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![batch_id, recipient_id, quantity, format_timestamp(donated_at)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 追加报废记录
    ///
    /// # 返回
    /// - Ok(waste_id)
    pub fn append_waste(
        &self,
        batch_id: i64,
        quantity: i64,
        reason: &str,
        wasted_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO waste_log (batch_id, quantity, reason, wasted_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![batch_id, quantity, reason, format_timestamp(wasted_at)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 更新批次数量与状态
    ///
    /// 条件更新：仅当批次仍为 AVAILABLE 且数量等于读取时的 expected_quantity。
    /// 未命中视为并发冲突，整个事务随之回滚。
    pub fn update_batch(
        &self,
        batch_id: i64,
        expected_quantity: i64,
        new_quantity: i64,
        new_status: BatchStatus,
    ) -> RepositoryResult<()> {
        let rows = self.conn.execute(
            r#"
            UPDATE batch
            SET quantity = ?1, status = ?2
            WHERE batch_id = ?3 AND status = 'AVAILABLE' AND quantity = ?4
            "#,
            params![new_quantity, new_status.to_db_str(), batch_id, expected_quantity],
        )?;

        if rows == 0 {
            return Err(RepositoryError::TransactionConflict(format!(
                "batch_id={} 已被并发修改 (expected quantity={})",
                batch_id, expected_quantity
            )));
        }
        Ok(())
    }
}
