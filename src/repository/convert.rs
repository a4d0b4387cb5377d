// ==========================================
// 易腐库存处置系统 - 字段格式转换
// ==========================================
// 日期: %Y-%m-%d；时间戳: %Y-%m-%d %H:%M:%S
// ==========================================

use crate::db::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::domain::types::BatchStatus;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_status(idx: usize, raw: &str) -> rusqlite::Result<BatchStatus> {
    BatchStatus::from_db_str(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown batch status: {}", raw).into(),
        )
    })
}
