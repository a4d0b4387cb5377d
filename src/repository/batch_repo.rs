// ==========================================
// 易腐库存处置系统 - 批次数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 批次的数量/状态只能经由 DispositionRepository 的事务修改
// ==========================================

use crate::domain::batch::{Batch, NewBatch};
use crate::domain::types::BatchStatus;
use crate::repository::convert::{
    format_date, format_timestamp, parse_date, parse_status, parse_timestamp,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub(crate) const BATCH_COLUMNS: &str =
    "batch_id, product_id, quantity, original_quantity, expiry_date, status, received_at";

/// 映射数据库行到 Batch 对象（列顺序见 BATCH_COLUMNS）
pub(crate) fn map_batch_row(row: &Row) -> rusqlite::Result<Batch> {
    Ok(Batch {
        batch_id: row.get(0)?,
        product_id: row.get(1)?,
        quantity: row.get(2)?,
        original_quantity: row.get(3)?,
        expiry_date: parse_date(4, &row.get::<_, String>(4)?)?,
        status: parse_status(5, &row.get::<_, String>(5)?)?,
        received_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
    })
}

// ==========================================
// BatchRepository - 批次仓储
// ==========================================
pub struct BatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 收货入库（新批次状态为 AVAILABLE，quantity = original_quantity）
    ///
    /// # 返回
    /// - Ok(batch_id): 新批次ID
    /// - Err(InvalidQuantity): quantity <= 0
    pub fn insert(&self, batch: &NewBatch) -> RepositoryResult<i64> {
        if batch.quantity <= 0 {
            return Err(RepositoryError::InvalidQuantity {
                quantity: batch.quantity,
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO batch (product_id, quantity, original_quantity, expiry_date, status, received_at)
            VALUES (?1, ?2, ?2, ?3, ?4, ?5)
            "#,
            params![
                batch.product_id,
                batch.quantity,
                format_date(batch.expiry_date),
                BatchStatus::Available.to_db_str(),
                format_timestamp(batch.received_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询批次
    pub fn find_by_id(&self, batch_id: i64) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM batch WHERE batch_id = ?1", BATCH_COLUMNS);
        let batch = conn
            .query_row(&sql, params![batch_id], map_batch_row)
            .optional()?;
        Ok(batch)
    }

    /// 按状态查询批次
    pub fn list_by_status(&self, status: BatchStatus) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM batch WHERE status = ?1 ORDER BY batch_id",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![status.to_db_str()], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// 查询过期日落在 [from, to] 区间内的可处置批次
    ///
    /// 排序: expiry_date 升序, batch_id 升序
    pub fn list_available_expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {}
               FROM batch
               WHERE status = 'AVAILABLE' AND expiry_date >= ?1 AND expiry_date <= ?2
               ORDER BY expiry_date, batch_id"#,
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![format_date(from), format_date(to)], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }
}
