// ==========================================
// 易腐库存处置系统 - 处置判定核心（纯函数）
// ==========================================
// 职责: 捐赠充足性校验、结果状态计算、过期清理资格判定
// 红线: 不访问数据库，只根据输入计算
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::types::BatchStatus;
use crate::engine::error::{DispositionError, DispositionResult};
use chrono::NaiveDate;

/// 一次捐赠的计算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationPlan {
    pub donated_quantity: i64,
    pub remaining_quantity: i64,
    pub resulting_status: BatchStatus,
}

/// 一次报废的计算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WastePlan {
    pub wasted_quantity: i64,
}

pub struct DispositionCore;

impl DispositionCore {
    /// 校验捐赠数量
    pub fn validate_quantity(quantity: i64) -> DispositionResult<()> {
        if quantity <= 0 {
            return Err(DispositionError::InvalidQuantity { quantity });
        }
        Ok(())
    }

    /// 计算捐赠结果
    ///
    /// # 规则
    /// - 终态批次可处置数量视为 0
    /// - 剩余恰为 0 时状态变为 DONATED，否则保持 AVAILABLE
    pub fn plan_donation(batch: &Batch, requested: i64) -> DispositionResult<DonationPlan> {
        Self::validate_quantity(requested)?;

        let available = if batch.status.is_terminal() {
            0
        } else {
            batch.quantity
        };

        if available < requested {
            return Err(DispositionError::InsufficientQuantity {
                batch_id: batch.batch_id,
                requested,
                available,
            });
        }

        let remaining_quantity = available - requested;
        let resulting_status = if remaining_quantity == 0 {
            BatchStatus::Donated
        } else {
            BatchStatus::Available
        };

        debug_assert!(batch.status.can_transition_to(resulting_status));

        Ok(DonationPlan {
            donated_quantity: requested,
            remaining_quantity,
            resulting_status,
        })
    }

    /// 是否应被过期清理: status == AVAILABLE 且 expiry_date < reference_date
    pub fn is_sweep_eligible(batch: &Batch, reference_date: NaiveDate) -> bool {
        batch.status == BatchStatus::Available && batch.is_expired_on(reference_date)
    }

    /// 计算报废结果（只报废剩余数量，而非入库数量）
    pub fn plan_waste(batch: &Batch) -> WastePlan {
        WastePlan {
            wasted_quantity: batch.quantity,
        }
    }
}
