// ==========================================
// 易腐库存处置系统 - 处置 API
// ==========================================
// 职责: 操作端/调度器调用的命令入口
// - donate(batch_id, recipient_id, quantity)
// - sweep_expired()
// - list_candidates(horizon_days)
// 辅助: batch_history / audit
// 约束: 当前日期/时间只在本层取得，引擎层一律显式传入
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use tracing::{info, warn};

use crate::api::response::CommandResponse;
use crate::config::config_manager::ConfigManager;
use crate::domain::batch::CandidateView;
use crate::domain::disposition::{DispositionEvent, DonationReceipt, SweepSummary};
use crate::engine::candidate_query::CandidateQuery;
use crate::engine::donation_allocator::DonationAllocator;
use crate::engine::error::{DispositionError, DispositionResult};
use crate::engine::expiry_sweeper::ExpirySweeper;
use crate::engine::invariant_audit::{AuditReport, InvariantAuditor};
use crate::repository::batch_repo::BatchRepository;
use crate::repository::disposition_log_repo::DispositionLogRepository;

// ==========================================
// DispositionApi - 处置 API
// ==========================================
pub struct DispositionApi {
    allocator: Arc<DonationAllocator<ConfigManager>>,
    sweeper: Arc<ExpirySweeper<ConfigManager>>,
    candidate_query: Arc<CandidateQuery<ConfigManager>>,
    auditor: Arc<InvariantAuditor>,
    batch_repo: Arc<BatchRepository>,
    log_repo: Arc<DispositionLogRepository>,
}

impl DispositionApi {
    /// 创建新的 DispositionApi 实例
    pub fn new(
        allocator: Arc<DonationAllocator<ConfigManager>>,
        sweeper: Arc<ExpirySweeper<ConfigManager>>,
        candidate_query: Arc<CandidateQuery<ConfigManager>>,
        auditor: Arc<InvariantAuditor>,
        batch_repo: Arc<BatchRepository>,
        log_repo: Arc<DispositionLogRepository>,
    ) -> Self {
        Self {
            allocator,
            sweeper,
            candidate_query,
            auditor,
            batch_repo,
            log_repo,
        }
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(0)
    }

    // ==========================================
    // 命令接口
    // ==========================================

    /// 捐赠（时间戳取当前时间）
    pub async fn donate(
        &self,
        batch_id: i64,
        recipient_id: i64,
        quantity: i64,
    ) -> CommandResponse<DonationReceipt> {
        self.donate_at(batch_id, recipient_id, quantity, Self::now())
            .await
    }

    /// 捐赠（显式时间戳）
    pub async fn donate_at(
        &self,
        batch_id: i64,
        recipient_id: i64,
        quantity: i64,
        donated_at: NaiveDateTime,
    ) -> CommandResponse<DonationReceipt> {
        let result = self
            .allocator
            .donate(batch_id, recipient_id, quantity, donated_at)
            .await;
        if let Err(ref e) = result {
            warn!(batch_id, recipient_id, quantity, code = e.code(), "捐赠失败: {}", e);
        }

        CommandResponse::from_result(result, |r| {
            format!(
                "批次 {} 向受赠方 {} 捐赠 {}，剩余 {}（{}）",
                r.batch_id, r.recipient_id, r.donated_quantity, r.remaining_quantity, r.status
            )
        })
    }

    /// 过期清理（参考日期为今天）
    pub async fn sweep_expired(&self) -> CommandResponse<SweepSummary> {
        let now = Self::now();
        self.sweep_expired_at(now.date(), now).await
    }

    /// 过期清理（显式参考日期与时间戳）
    pub async fn sweep_expired_at(
        &self,
        reference_date: NaiveDate,
        swept_at: NaiveDateTime,
    ) -> CommandResponse<SweepSummary> {
        let result = self.sweeper.sweep_expired(reference_date, swept_at).await;
        if let Err(ref e) = result {
            warn!(%reference_date, code = e.code(), "过期清理失败: {}", e);
        }

        CommandResponse::from_result(result, |s| {
            if s.is_empty() {
                format!("{} 之前无过期批次", s.reference_date)
            } else {
                format!(
                    "已报废 {} 个批次，共 {} 件",
                    s.batches_wasted, s.total_quantity_wasted
                )
            }
        })
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 捐赠候选（参考日期为今天）
    pub async fn list_candidates(
        &self,
        horizon_days: Option<u32>,
    ) -> CommandResponse<Vec<CandidateView>> {
        self.list_candidates_as_of(Self::now().date(), horizon_days)
            .await
    }

    /// 捐赠候选（显式参考日期）
    pub async fn list_candidates_as_of(
        &self,
        reference_date: NaiveDate,
        horizon_days: Option<u32>,
    ) -> CommandResponse<Vec<CandidateView>> {
        let result = self
            .candidate_query
            .list_candidates(reference_date, horizon_days)
            .await;

        CommandResponse::from_result(result, |c| format!("共 {} 个捐赠候选批次", c.len()))
    }

    /// 批次处置历史（捐赠 + 报废，按时间排序）
    pub fn batch_history(&self, batch_id: i64) -> CommandResponse<Vec<DispositionEvent>> {
        let result = self.load_history(batch_id);
        CommandResponse::from_result(result, |events| {
            format!("批次 {} 共 {} 条处置记录", batch_id, events.len())
        })
    }

    fn load_history(&self, batch_id: i64) -> DispositionResult<Vec<DispositionEvent>> {
        if self.batch_repo.find_by_id(batch_id)?.is_none() {
            return Err(DispositionError::BatchNotFound { batch_id });
        }
        Ok(self.log_repo.events_for_batch(batch_id)?)
    }

    /// 不变量审计
    pub fn audit(&self) -> CommandResponse<AuditReport> {
        let result = self.auditor.audit();
        CommandResponse::from_result(result, |report| {
            if report.is_clean() {
                info!(batches = report.batches_checked, "审计通过");
                format!("已检查 {} 个批次，未发现不变量违反", report.batches_checked)
            } else {
                format!(
                    "已检查 {} 个批次，发现 {} 处不变量违反",
                    report.batches_checked,
                    report.violations.len()
                )
            }
        })
    }
}
