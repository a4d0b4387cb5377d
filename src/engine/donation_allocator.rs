// ==========================================
// 易腐库存处置系统 - 捐赠分配引擎
// ==========================================
// 红线: 充足性校验、日志追加、批次扣减在同一事务内完成
// 红线: 非幂等，每次调用代表一次独立的实物捐赠
// ==========================================
// 输入: batch_id, recipient_id, quantity, donated_at
// 输出: DonationReceipt，或 DispositionError（无任何部分写入）
// ==========================================

use crate::config::DispositionConfigReader;
use crate::directory::RecipientDirectory;
use crate::domain::disposition::DonationReceipt;
use crate::engine::disposition_core::DispositionCore;
use crate::engine::error::{DispositionError, DispositionResult};
use crate::engine::retry::RetryPolicy;
use crate::repository::disposition_repo::DispositionRepository;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// DonationAllocator - 捐赠分配引擎
// ==========================================
pub struct DonationAllocator<C>
where
    C: DispositionConfigReader,
{
    disposition_repo: Arc<DispositionRepository>,
    recipients: Arc<dyn RecipientDirectory>,
    config: Arc<C>,
}

impl<C> DonationAllocator<C>
where
    C: DispositionConfigReader,
{
    /// 创建新的 DonationAllocator 实例
    ///
    /// # 参数
    /// - disposition_repo: 处置事务仓储
    /// - recipients: 受赠方目录（只读）
    /// - config: 配置读取器
    pub fn new(
        disposition_repo: Arc<DispositionRepository>,
        recipients: Arc<dyn RecipientDirectory>,
        config: Arc<C>,
    ) -> Self {
        Self {
            disposition_repo,
            recipients,
            config,
        }
    }

    /// 从批次捐赠指定数量
    ///
    /// # 校验顺序
    /// 1. quantity > 0（InvalidQuantity）
    /// 2. 受赠方存在（RecipientNotFound）
    /// 3. 事务内: 批次存在（BatchNotFound）、数量充足（InsufficientQuantity）
    ///
    /// # 事务
    /// - 追加恰好一条捐赠记录，再扣减批次数量；剩余为 0 时状态变为 DONATED
    /// - 事务冲突按配置有限重试
    #[instrument(skip(self))]
    pub async fn donate(
        &self,
        batch_id: i64,
        recipient_id: i64,
        quantity: i64,
        donated_at: NaiveDateTime,
    ) -> DispositionResult<DonationReceipt> {
        DispositionCore::validate_quantity(quantity)?;

        if !self.recipients.recipient_exists(recipient_id).await? {
            return Err(DispositionError::RecipientNotFound { recipient_id });
        }

        let policy = RetryPolicy::new(
            self.config.get_conflict_max_retries().await?,
            self.config.get_conflict_retry_backoff_ms().await?,
        );

        let receipt = policy
            .run("donate", || {
                self.disposition_repo
                    .run_in_transaction(|tx| -> DispositionResult<DonationReceipt> {
                        let batch = tx
                            .fetch_batch(batch_id)?
                            .ok_or(DispositionError::BatchNotFound { batch_id })?;

                        let plan = DispositionCore::plan_donation(&batch, quantity)?;

                        let donation_id = tx.append_donation(
                            batch_id,
                            recipient_id,
                            plan.donated_quantity,
                            donated_at,
                        )?;
                        tx.update_batch(
                            batch_id,
                            batch.quantity,
                            plan.remaining_quantity,
                            plan.resulting_status,
                        )?;

                        Ok(DonationReceipt {
                            donation_id,
                            batch_id,
                            recipient_id,
                            donated_quantity: plan.donated_quantity,
                            remaining_quantity: plan.remaining_quantity,
                            status: plan.resulting_status,
                            donated_at,
                        })
                    })
            })
            .await?;

        info!(
            donation_id = receipt.donation_id,
            remaining = receipt.remaining_quantity,
            status = %receipt.status,
            "捐赠已登记"
        );
        Ok(receipt)
    }
}
