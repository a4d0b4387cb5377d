// ==========================================
// 易腐库存处置系统 - 不变量审计
// ==========================================
// 职责: 对照批次表与两类处置日志，报告全部不变量违反
// 红线: 只读，不做任何修复
// ==========================================

use crate::domain::types::BatchStatus;
use crate::engine::error::DispositionResult;
use crate::repository::disposition_repo::DispositionRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};

/// 违反类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    NegativeQuantity,         // quantity < 0
    DonatedWithRemaining,     // DONATED 但 quantity != 0
    DonationTotalMismatch,    // DONATED 但捐赠合计 != 入库数量
    WastedWithRemaining,      // WASTED 但 quantity != 0
    WasteRecordCount,         // WASTED 但报废记录条数 != 1
    AvailableBalanceMismatch, // AVAILABLE 但 quantity + 已捐赠 != 入库数量
    AvailableWithWasteRecord, // AVAILABLE 却存在报废记录
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub batch_id: i64,
    pub kind: ViolationKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub batches_checked: usize,
    pub violations: Vec<InvariantViolation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

pub struct InvariantAuditor {
    disposition_repo: Arc<DispositionRepository>,
}

impl InvariantAuditor {
    pub fn new(disposition_repo: Arc<DispositionRepository>) -> Self {
        Self { disposition_repo }
    }

    /// 审计全部批次
    ///
    /// 批次、捐赠合计、报废条数取自同一读快照，并发处置不会造成误报。
    #[instrument(skip(self))]
    pub fn audit(&self) -> DispositionResult<AuditReport> {
        let (batches, donated, wastes) = self
            .disposition_repo
            .read_snapshot(|tx| -> DispositionResult<_> {
                Ok((tx.list_batches()?, tx.donated_totals()?, tx.waste_counts()?))
            })?;

        let mut report = AuditReport {
            batches_checked: batches.len(),
            violations: Vec::new(),
        };

        for batch in &batches {
            let donated_total = donated.get(&batch.batch_id).copied().unwrap_or(0);
            let waste_count = wastes.get(&batch.batch_id).copied().unwrap_or(0);
            let mut flag = |kind: ViolationKind, detail: String| {
                report.violations.push(InvariantViolation {
                    batch_id: batch.batch_id,
                    kind,
                    detail,
                });
            };

            if batch.quantity < 0 {
                flag(
                    ViolationKind::NegativeQuantity,
                    format!("quantity={}", batch.quantity),
                );
            }

            match batch.status {
                BatchStatus::Donated => {
                    if batch.quantity != 0 {
                        flag(
                            ViolationKind::DonatedWithRemaining,
                            format!("quantity={}", batch.quantity),
                        );
                    }
                    if donated_total != batch.original_quantity {
                        flag(
                            ViolationKind::DonationTotalMismatch,
                            format!(
                                "donated_total={}, original_quantity={}",
                                donated_total, batch.original_quantity
                            ),
                        );
                    }
                }
                BatchStatus::Wasted => {
                    if batch.quantity != 0 {
                        flag(
                            ViolationKind::WastedWithRemaining,
                            format!("quantity={}", batch.quantity),
                        );
                    }
                    if waste_count != 1 {
                        flag(
                            ViolationKind::WasteRecordCount,
                            format!("waste_records={}", waste_count),
                        );
                    }
                }
                BatchStatus::Available => {
                    if batch.quantity + donated_total != batch.original_quantity {
                        flag(
                            ViolationKind::AvailableBalanceMismatch,
                            format!(
                                "quantity={}, donated_total={}, original_quantity={}",
                                batch.quantity, donated_total, batch.original_quantity
                            ),
                        );
                    }
                    if waste_count > 0 {
                        flag(
                            ViolationKind::AvailableWithWasteRecord,
                            format!("waste_records={}", waste_count),
                        );
                    }
                }
            }
        }

        if !report.is_clean() {
            warn!(violations = report.violations.len(), "发现不变量违反");
        }
        Ok(report)
    }
}
