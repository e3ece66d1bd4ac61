use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::flex;

/// 餐饮计划类型 (远端 QueryBillType)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanType {
    #[serde(default, deserialize_with = "flex::text")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "flex::text")]
    pub name: String,
}

/// 已上传的餐饮计划文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    #[serde(default, deserialize_with = "flex::text")]
    pub id: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub meal_plan_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub file_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub create_at: String,
    #[serde(default, deserialize_with = "flex::opt_int")]
    pub long_bill_count: Option<i64>,
    #[serde(default, deserialize_with = "flex::opt_text")]
    pub bill_type: Option<String>,
}

/// 餐饮计划明细 (生成长账单的来源)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanItem {
    #[serde(default, deserialize_with = "flex::text")]
    pub id: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub meal_plan_id: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub name: String,
    #[serde(with = "flex::amount", default)]
    pub quantity: BigDecimal,
    #[serde(default, deserialize_with = "flex::text")]
    pub unit: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub event_date: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub descriptive_of_event: String,
    #[serde(default, deserialize_with = "flex::opt_int")]
    pub event_id: Option<i64>,
    #[serde(default, deserialize_with = "flex::text")]
    pub event_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub company_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub item_description: String,
    #[serde(with = "flex::amount", default)]
    pub price: BigDecimal,
    #[serde(default, deserialize_with = "flex::opt_text")]
    pub waiter: Option<String>,
    #[serde(default, deserialize_with = "flex::text")]
    pub receiver: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub receiver_full_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub signature: String,
}

/// 生成账单前对计划明细的编辑
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PlanItemEdit {
    EventDate(String),
    DescriptiveOfEvent(String),
    ItemDescription(String),
    Price(String),
    Unit(String),
    EventId(String),
    EventName(String),
    CompanyName(String),
    Receiver(String),
    ReceiverFullName(String),
    Signature(String),
    Waiter(String),
}

impl PlanItemEdit {
    pub fn apply(self, item: &mut MealPlanItem) {
        match self {
            PlanItemEdit::EventDate(v) => item.event_date = v,
            PlanItemEdit::DescriptiveOfEvent(v) => item.descriptive_of_event = v,
            PlanItemEdit::ItemDescription(v) => item.item_description = v,
            PlanItemEdit::Price(raw) => item.price = flex::coerce_amount(&raw),
            PlanItemEdit::Unit(v) => item.unit = v,
            PlanItemEdit::EventId(raw) => item.event_id = flex::coerce_int(&raw),
            PlanItemEdit::EventName(v) => item.event_name = v,
            PlanItemEdit::CompanyName(v) => item.company_name = v,
            PlanItemEdit::Receiver(v) => item.receiver = v,
            PlanItemEdit::ReceiverFullName(v) => item.receiver_full_name = v,
            PlanItemEdit::Signature(v) => item.signature = v,
            PlanItemEdit::Waiter(v) => item.waiter = Some(v).filter(|s| !s.is_empty()),
        }
    }
}

/// 上传餐饮计划文件
#[derive(Debug, Clone)]
pub struct PlanUpload {
    pub name: String,
    pub bill_type: Option<String>,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl PlanUpload {
    /// 名称与文件内容都必须非空
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.content.is_empty()
    }
}
