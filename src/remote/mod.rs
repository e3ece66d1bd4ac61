pub mod http;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::{BillRecord, BillSummary, LineItem, MealPlan, MealPlanItem, PlanType, PlanUpload};

pub use http::HttpRemote;

/// 远端业务服务
///
/// 所有数据读写都通过它完成；写操作统一返回 `{status, message?}` 回执，
/// 非 success 即为失败。
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn fetch_plan_types(&self) -> Result<Vec<PlanType>, RemoteError>;

    async fn fetch_meal_plans(&self, bill_type: Option<&str>) -> Result<Vec<MealPlan>, RemoteError>;

    async fn fetch_plan_items(&self, plan_id: &str) -> Result<Vec<MealPlanItem>, RemoteError>;

    async fn fetch_bill_list(&self, plan_id: &str) -> Result<Vec<BillSummary>, RemoteError>;

    async fn fetch_items(&self, bill_id: &str) -> Result<Vec<LineItem>, RemoteError>;

    async fn save_bill(&self, record: &BillRecord) -> Result<(), RemoteError>;

    async fn generate_bill(&self, items: &[MealPlanItem]) -> Result<(), RemoteError>;

    async fn delete_plan(&self, plan_id: &str) -> Result<(), RemoteError>;

    async fn upload_plan(&self, upload: &PlanUpload) -> Result<(), RemoteError>;
}
