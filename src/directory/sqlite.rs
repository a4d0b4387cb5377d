// ==========================================
// 易腐库存处置系统 - 外部目录的 SQLite 只读实现
// ==========================================
// 对齐: product / recipient 表
// ==========================================

use super::{ProductCatalog, ProductInfo, RecipientDirectory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

fn lock(conn: &Mutex<Connection>) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

// ==========================================
// SqliteProductCatalog
// ==========================================
pub struct SqliteProductCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProductCatalog {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ProductCatalog for SqliteProductCatalog {
    async fn get_product(&self, product_id: i64) -> RepositoryResult<Option<ProductInfo>> {
        let conn = lock(&self.conn)?;
        let product = conn
            .query_row(
                "SELECT name, category_id FROM product WHERE product_id = ?1",
                params![product_id],
                |row| {
                    Ok(ProductInfo {
                        name: row.get(0)?,
                        category_id: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(product)
    }
}

// ==========================================
// SqliteRecipientDirectory
// ==========================================
pub struct SqliteRecipientDirectory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecipientDirectory {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecipientDirectory for SqliteRecipientDirectory {
    async fn recipient_exists(&self, recipient_id: i64) -> RepositoryResult<bool> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipient WHERE recipient_id = ?1",
            params![recipient_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
