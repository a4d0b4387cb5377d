// ==========================================
// 易腐库存处置系统 - 捐赠候选查询
// ==========================================
// 红线: 只读投影，无副作用
// 选取: status == AVAILABLE 且 reference_date <= expiry_date <= reference_date + horizon
// 排序: expiry_date 升序（最紧急在前），batch_id 升序
// ==========================================

use crate::config::DispositionConfigReader;
use crate::directory::{ProductCatalog, ProductInfo};
use crate::domain::batch::CandidateView;
use crate::engine::error::DispositionResult;
use crate::repository::batch_repo::BatchRepository;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};

pub struct CandidateQuery<C>
where
    C: DispositionConfigReader,
{
    batch_repo: Arc<BatchRepository>,
    catalog: Arc<dyn ProductCatalog>,
    config: Arc<C>,
}

impl<C> CandidateQuery<C>
where
    C: DispositionConfigReader,
{
    pub fn new(
        batch_repo: Arc<BatchRepository>,
        catalog: Arc<dyn ProductCatalog>,
        config: Arc<C>,
    ) -> Self {
        Self {
            batch_repo,
            catalog,
            config,
        }
    }

    /// 列出捐赠候选
    ///
    /// # 参数
    /// - reference_date: 参考日期（含）
    /// - horizon_days: 时间窗口；None 时读取配置 candidate_horizon_days
    #[instrument(skip(self))]
    pub async fn list_candidates(
        &self,
        reference_date: NaiveDate,
        horizon_days: Option<u32>,
    ) -> DispositionResult<Vec<CandidateView>> {
        let horizon = match horizon_days {
            Some(days) => days,
            None => self.config.get_candidate_horizon_days().await?,
        };
        let until = reference_date
            .checked_add_days(Days::new(u64::from(horizon)))
            .unwrap_or(NaiveDate::MAX);

        let batches = self
            .batch_repo
            .list_available_expiring_between(reference_date, until)?;

        let mut products: HashMap<i64, Option<ProductInfo>> = HashMap::new();
        let mut candidates = Vec::with_capacity(batches.len());
        for batch in batches {
            if !products.contains_key(&batch.product_id) {
                let info = self.catalog.get_product(batch.product_id).await?;
                if info.is_none() {
                    warn!(product_id = batch.product_id, "商品目录未收录该商品");
                }
                products.insert(batch.product_id, info);
            }
            let product = products.get(&batch.product_id).cloned().flatten();

            candidates.push(CandidateView {
                batch_id: batch.batch_id,
                product_id: batch.product_id,
                product_name: product.as_ref().map(|p| p.name.clone()),
                category_id: product.and_then(|p| p.category_id),
                quantity: batch.quantity,
                expiry_date: batch.expiry_date,
                days_left: batch.days_left(reference_date),
            });
        }

        Ok(candidates)
    }
}
