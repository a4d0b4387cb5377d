// ==========================================
// 易腐库存处置系统 - 过期清理引擎
// ==========================================
// 红线: 选取与变更在同一事务快照内完成（一次清理 = 一个原子单元）
// 红线: 只报废剩余数量；已 DONATED / WASTED 的批次不再处理
// ==========================================
// 输入: reference_date, swept_at
// 输出: SweepSummary（无匹配批次同样视为成功）
// ==========================================

use crate::config::DispositionConfigReader;
use crate::domain::disposition::SweepSummary;
use crate::domain::types::BatchStatus;
use crate::engine::disposition_core::DispositionCore;
use crate::engine::error::DispositionResult;
use crate::engine::retry::RetryPolicy;
use crate::repository::disposition_repo::DispositionRepository;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info, instrument};

// ==========================================
// ExpirySweeper - 过期清理引擎
// ==========================================
pub struct ExpirySweeper<C>
where
    C: DispositionConfigReader,
{
    disposition_repo: Arc<DispositionRepository>,
    config: Arc<C>,
}

impl<C> ExpirySweeper<C>
where
    C: DispositionConfigReader,
{
    pub fn new(disposition_repo: Arc<DispositionRepository>, config: Arc<C>) -> Self {
        Self {
            disposition_repo,
            config,
        }
    }

    /// 清理参考日期前已过期的全部可处置批次
    ///
    /// # 规则
    /// - 选取条件: status == AVAILABLE 且 expiry_date < reference_date
    /// - 按 batch_id 升序逐个: 追加报废记录（剩余数量），数量置 0，状态置 WASTED
    /// - 任一批次失败则整次清理回滚
    #[instrument(skip(self))]
    pub async fn sweep_expired(
        &self,
        reference_date: NaiveDate,
        swept_at: NaiveDateTime,
    ) -> DispositionResult<SweepSummary> {
        let reason = self.config.get_waste_reason().await?;
        let policy = RetryPolicy::new(
            self.config.get_conflict_max_retries().await?,
            self.config.get_conflict_retry_backoff_ms().await?,
        );

        let summary = policy
            .run("sweep_expired", || {
                self.disposition_repo
                    .run_in_transaction(|tx| -> DispositionResult<SweepSummary> {
                        let mut summary = SweepSummary::empty(reference_date);

                        for batch in tx.fetch_expired_available(reference_date)? {
                            debug_assert!(DispositionCore::is_sweep_eligible(
                                &batch,
                                reference_date
                            ));

                            let plan = DispositionCore::plan_waste(&batch);
                            tx.append_waste(
                                batch.batch_id,
                                plan.wasted_quantity,
                                &reason,
                                swept_at,
                            )?;
                            tx.update_batch(
                                batch.batch_id,
                                batch.quantity,
                                0,
                                BatchStatus::Wasted,
                            )?;

                            debug!(
                                batch_id = batch.batch_id,
                                quantity = plan.wasted_quantity,
                                expiry_date = %batch.expiry_date,
                                "批次已报废"
                            );

                            summary.batches_wasted += 1;
                            summary.total_quantity_wasted += plan.wasted_quantity;
                            summary.wasted_batch_ids.push(batch.batch_id);
                        }

                        Ok(summary)
                    })
            })
            .await?;

        info!(
            batches_wasted = summary.batches_wasted,
            total_quantity_wasted = summary.total_quantity_wasted,
            "过期清理完成"
        );
        Ok(summary)
    }
}
