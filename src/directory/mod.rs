// ==========================================
// 易腐库存处置系统 - 外部目录查询接口
// ==========================================
// 职责: 定义核心所需的只读查询（商品目录、受赠方目录）
// 红线: 核心从不写入这些目录
// ==========================================

mod sqlite;

pub use sqlite::{SqliteProductCatalog, SqliteRecipientDirectory};

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 商品信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub category_id: Option<i64>,
}

// ==========================================
// ProductCatalog Trait
// ==========================================
// 用途: 候选视图补充商品名称/分类
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// 查询商品（不存在返回 None）
    async fn get_product(&self, product_id: i64) -> RepositoryResult<Option<ProductInfo>>;
}

// ==========================================
// RecipientDirectory Trait
// ==========================================
// 用途: 捐赠前校验受赠方存在
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn recipient_exists(&self, recipient_id: i64) -> RepositoryResult<bool>;
}
