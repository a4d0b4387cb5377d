// ==========================================
// 易腐库存处置系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout、WAL）
// - 统一建库脚本（batch / donation_log / waste_log 三个核心集合 + 外部只读表）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
///
/// 锁等待上限；超时后 SQLite 返回 BUSY，上层映射为 TransactionConflict。
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 时间戳存储格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
///
/// 文件库额外开启 WAL，读查询不阻塞处置事务。
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 外部目录（只读查询，核心不写入）
        CREATE TABLE IF NOT EXISTS category (
            category_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS product (
            product_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_id INTEGER REFERENCES category(category_id)
        );

        CREATE TABLE IF NOT EXISTS recipient (
            recipient_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        -- 批次（唯一事实层）
        CREATE TABLE IF NOT EXISTS batch (
            batch_id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES product(product_id),
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            original_quantity INTEGER NOT NULL CHECK (original_quantity > 0),
            expiry_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'AVAILABLE'
                CHECK (status IN ('AVAILABLE', 'DONATED', 'WASTED')),
            received_at TEXT NOT NULL,
            CHECK (quantity <= original_quantity)
        );

        CREATE INDEX IF NOT EXISTS idx_batch_status_expiry
            ON batch(status, expiry_date);

        -- 捐赠日志（只追加）
        CREATE TABLE IF NOT EXISTS donation_log (
            donation_id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id INTEGER NOT NULL REFERENCES batch(batch_id),
            recipient_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            donated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_donation_log_batch
            ON donation_log(batch_id, donated_at);

        -- 报废日志（只追加）
        CREATE TABLE IF NOT EXISTS waste_log (
            waste_id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id INTEGER NOT NULL REFERENCES batch(batch_id),
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            reason TEXT NOT NULL DEFAULT 'expired',
            wasted_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_waste_log_batch
            ON waste_log(batch_id, wasted_at);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get(0)
    })?;
    Ok(v)
}
