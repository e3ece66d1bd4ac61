use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::RemoteService;
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::models::{
    BillRecord, BillSummary, Envelope, LineItem, MealPlan, MealPlanItem, PlanType, PlanUpload,
};

/// 基于 reqwest 的远端服务客户端
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", path, e);
            RemoteError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("{} responded with HTTP {}", path, status);
            return Err(RemoteError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, RemoteError> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Unexpected body from {}: {}", path, e);
            RemoteError::Decode(e.to_string())
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self.send(self.client.get(self.url(path)), path).await?;
        Self::decode(response, path).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let request = self.client.post(self.url(path)).form(form);
        let response = self.send(request, path).await?;
        Self::decode(response, path).await
    }

    async fn post_json_envelope(&self, path: &str, body: &serde_json::Value) -> Result<(), RemoteError> {
        let response = self.send(self.client.post(self.url(path)).json(body), path).await?;
        Self::expect_success(response, path).await
    }

    async fn post_form_envelope(&self, path: &str, form: &[(&str, &str)]) -> Result<(), RemoteError> {
        let response = self.send(self.client.post(self.url(path)).form(form), path).await?;
        Self::expect_success(response, path).await
    }

    /// 按回执判断成败
    async fn expect_success(response: Response, path: &str) -> Result<(), RemoteError> {
        let envelope: Envelope = Self::decode(response, path).await?;
        if !envelope.is_success() {
            tracing::warn!("{} rejected: {:?}", path, envelope.message);
        }
        envelope.into_result()
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn fetch_plan_types(&self) -> Result<Vec<PlanType>, RemoteError> {
        self.get_json("QueryBillType").await
    }

    async fn fetch_meal_plans(&self, bill_type: Option<&str>) -> Result<Vec<MealPlan>, RemoteError> {
        let form: Vec<(&str, &str)> = bill_type
            .filter(|t| !t.is_empty())
            .map(|t| vec![("bill_type", t)])
            .unwrap_or_default();
        self.post_form("QueryMealPlanList", &form).await
    }

    async fn fetch_plan_items(&self, plan_id: &str) -> Result<Vec<MealPlanItem>, RemoteError> {
        self.post_form("QueryMealPlanItem", &[("meal_plan_id", plan_id)])
            .await
    }

    async fn fetch_bill_list(&self, plan_id: &str) -> Result<Vec<BillSummary>, RemoteError> {
        self.post_form("QueryLongBillList", &[("meal_plan_id", plan_id)])
            .await
    }

    async fn fetch_items(&self, bill_id: &str) -> Result<Vec<LineItem>, RemoteError> {
        tracing::info!("Fetching items for long bill {}", bill_id);
        self.post_form("QueryLongBillItems", &[("longbill_id", bill_id)])
            .await
    }

    async fn save_bill(&self, record: &BillRecord) -> Result<(), RemoteError> {
        let body = json!({ "LongBillData": record });
        self.post_json_envelope("LongBillData", &body).await
    }

    async fn generate_bill(&self, items: &[MealPlanItem]) -> Result<(), RemoteError> {
        let body = json!({ "MealPlanItem": items });
        self.post_json_envelope("GenerateLongBillFromJson", &body).await
    }

    async fn delete_plan(&self, plan_id: &str) -> Result<(), RemoteError> {
        self.post_form_envelope("DeleteMealPlan", &[("meal_plan_id", plan_id)])
            .await
    }

    async fn upload_plan(&self, upload: &PlanUpload) -> Result<(), RemoteError> {
        let body = json!({
            "meal_plan_name": upload.name,
            "bill_type": upload.bill_type,
            "file_name": upload.file_name,
            "file": STANDARD.encode(&upload.content),
        });
        tracing::info!(
            "Uploading meal plan {} ({} bytes)",
            upload.file_name,
            upload.content.len()
        );
        self.post_json_envelope("UploadMealPlan", &body).await
    }
}
