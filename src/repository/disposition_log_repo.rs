// ==========================================
// 易腐库存处置系统 - 处置日志数据仓储（只读）
// ==========================================
// 对齐: donation_log / waste_log 表
// 红线: 日志的写入只发生在 DispositionRepository 的处置事务内
// ==========================================

use crate::domain::disposition::{DispositionEvent, DonationRecord, WasteRecord};
use crate::repository::convert::parse_timestamp;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

fn map_donation_row(row: &Row) -> rusqlite::Result<DonationRecord> {
    Ok(DonationRecord {
        donation_id: row.get(0)?,
        batch_id: row.get(1)?,
        recipient_id: row.get(2)?,
        quantity: row.get(3)?,
        donated_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

fn map_waste_row(row: &Row) -> rusqlite::Result<WasteRecord> {
    Ok(WasteRecord {
        waste_id: row.get(0)?,
        batch_id: row.get(1)?,
        quantity: row.get(2)?,
        reason: row.get(3)?,
        wasted_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

// ==========================================
// DispositionLogRepository - 处置日志仓储
// ==========================================
pub struct DispositionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DispositionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 捐赠日志
    // ==========================================

    /// 查询批次的捐赠记录（按写入顺序）
    pub fn list_donations_by_batch(
        &self,
        batch_id: i64,
    ) -> RepositoryResult<Vec<DonationRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT donation_id, batch_id, recipient_id, quantity, donated_at
               FROM donation_log
               WHERE batch_id = ?1
               ORDER BY donation_id"#,
        )?;
        let records = stmt
            .query_map(params![batch_id], map_donation_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 查询全部捐赠记录
    pub fn list_donations(&self) -> RepositoryResult<Vec<DonationRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT donation_id, batch_id, recipient_id, quantity, donated_at
               FROM donation_log
               ORDER BY donation_id"#,
        )?;
        let records = stmt
            .query_map([], map_donation_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ==========================================
    // 报废日志
    // ==========================================

    /// 查询批次的报废记录
    pub fn list_wastes_by_batch(&self, batch_id: i64) -> RepositoryResult<Vec<WasteRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT waste_id, batch_id, quantity, reason, wasted_at
               FROM waste_log
               WHERE batch_id = ?1
               ORDER BY waste_id"#,
        )?;
        let records = stmt
            .query_map(params![batch_id], map_waste_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 查询全部报废记录
    pub fn list_wastes(&self) -> RepositoryResult<Vec<WasteRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT waste_id, batch_id, quantity, reason, wasted_at
               FROM waste_log
               ORDER BY waste_id"#,
        )?;
        let records = stmt
            .query_map([], map_waste_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ==========================================
    // 统一事件流
    // ==========================================

    /// 批次的处置事件流（按发生时间排序；同一时刻捐赠先于报废）
    pub fn events_for_batch(&self, batch_id: i64) -> RepositoryResult<Vec<DispositionEvent>> {
        let mut events: Vec<DispositionEvent> = self
            .list_donations_by_batch(batch_id)?
            .into_iter()
            .map(DispositionEvent::Donated)
            .collect();
        events.extend(
            self.list_wastes_by_batch(batch_id)?
                .into_iter()
                .map(DispositionEvent::Wasted),
        );

        // sort_by_key 为稳定排序，捐赠在前的插入顺序得以保留
        events.sort_by_key(|e| e.occurred_at());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO product (name) VALUES ('面包');
            INSERT INTO batch (product_id, quantity, original_quantity, expiry_date, status, received_at)
            VALUES (1, 0, 30, '2026-03-05', 'WASTED', '2026-03-01 08:00:00');
            INSERT INTO donation_log (batch_id, recipient_id, quantity, donated_at)
            VALUES (1, 7, 10, '2026-03-02 10:00:00'),
                   (1, 8, 5, '2026-03-04 10:00:00');
            INSERT INTO waste_log (batch_id, quantity, reason, wasted_at)
            VALUES (1, 15, 'expired', '2026-03-06 00:00:00');
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_events_for_batch_are_time_ordered() {
        let repo = DispositionLogRepository::new(setup_test_db());

        let events = repo.events_for_batch(1).unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], DispositionEvent::Donated(ref r) if r.recipient_id == 7));
        assert!(matches!(events[1], DispositionEvent::Donated(ref r) if r.recipient_id == 8));
        assert!(matches!(events[2], DispositionEvent::Wasted(ref r) if r.quantity == 15));
        assert!(events.iter().all(|e| e.batch_id() == 1));
    }

    #[test]
    fn test_lists_by_batch_and_in_full() {
        let repo = DispositionLogRepository::new(setup_test_db());

        assert_eq!(repo.list_donations().unwrap().len(), 2);
        assert_eq!(repo.list_wastes().unwrap().len(), 1);
        assert_eq!(repo.list_wastes_by_batch(1).unwrap()[0].reason, "expired");
        assert!(repo.list_donations_by_batch(2).unwrap().is_empty());
    }
}
