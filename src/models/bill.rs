use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::flex;
use super::line_item::LineItem;

/// 账单状态 (1=新建, 2=已取消)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    New = 1,
    Cancelled = 2,
}

impl BillStatus {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(BillStatus::New),
            2 => Some(BillStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BillStatus::New => "New",
            BillStatus::Cancelled => "Cancelled",
        }
    }
}

impl Serialize for BillStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for BillStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = flex::opt_int(deserializer)?;
        code.and_then(BillStatus::from_code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown bill status: {:?}", code)))
    }
}

fn opt_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BillStatus>, D::Error> {
    Ok(flex::opt_int(deserializer)?.and_then(BillStatus::from_code))
}

/// 长账单表头 (列表接口返回的摘要也是这个形状)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillHeader {
    #[serde(default, deserialize_with = "flex::text")]
    pub id: String,
    #[serde(default, deserialize_with = "flex::opt_int")]
    pub meal_plan_id: Option<i64>,
    #[serde(default, deserialize_with = "flex::opt_int")]
    pub running_id: Option<i64>,
    #[serde(default, deserialize_with = "flex::opt_text")]
    pub bill_type: Option<String>,
    #[serde(default, deserialize_with = "flex::text")]
    pub event_date: String,
    #[serde(default, deserialize_with = "flex::opt_int")]
    pub event_id: Option<i64>,
    #[serde(default, deserialize_with = "flex::text")]
    pub venue: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub event_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub company_name: String,
    #[serde(default, deserialize_with = "flex::opt_text")]
    pub waiter: Option<String>,
    #[serde(default, deserialize_with = "opt_status")]
    pub status: Option<BillStatus>,
    #[serde(default, deserialize_with = "flex::text")]
    pub receiver: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub receiver_full_name: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub signature: String,
}

/// 账单列表摘要
pub type BillSummary = BillHeader;

/// 完整长账单：表头 + 明细 (线上为扁平结构)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    #[serde(flatten)]
    pub header: BillHeader,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// 视图模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

impl EditMode {
    pub fn is_editing(self) -> bool {
        matches!(self, EditMode::Editing)
    }
}

/// 表头可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    EventDate,
    EventId,
    RunningId,
    Venue,
    EventName,
    CompanyName,
    Waiter,
    Receiver,
    ReceiverFullName,
    Signature,
}

/// 表头编辑操作，值为用户原始输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum HeaderEdit {
    EventDate(String),
    EventId(String),
    RunningId(String),
    Venue(String),
    EventName(String),
    CompanyName(String),
    Waiter(String),
    Receiver(String),
    ReceiverFullName(String),
    Signature(String),
}

impl HeaderEdit {
    pub fn field(&self) -> HeaderField {
        match self {
            HeaderEdit::EventDate(_) => HeaderField::EventDate,
            HeaderEdit::EventId(_) => HeaderField::EventId,
            HeaderEdit::RunningId(_) => HeaderField::RunningId,
            HeaderEdit::Venue(_) => HeaderField::Venue,
            HeaderEdit::EventName(_) => HeaderField::EventName,
            HeaderEdit::CompanyName(_) => HeaderField::CompanyName,
            HeaderEdit::Waiter(_) => HeaderField::Waiter,
            HeaderEdit::Receiver(_) => HeaderField::Receiver,
            HeaderEdit::ReceiverFullName(_) => HeaderField::ReceiverFullName,
            HeaderEdit::Signature(_) => HeaderField::Signature,
        }
    }

    /// 应用到表头；数字字段非数字输入清空
    pub fn apply(self, header: &mut BillHeader) {
        match self {
            HeaderEdit::EventDate(raw) => header.event_date = raw,
            HeaderEdit::EventId(raw) => header.event_id = flex::coerce_int(&raw),
            HeaderEdit::RunningId(raw) => header.running_id = flex::coerce_int(&raw),
            HeaderEdit::Venue(text) => header.venue = text,
            HeaderEdit::EventName(text) => header.event_name = text,
            HeaderEdit::CompanyName(text) => header.company_name = text,
            HeaderEdit::Waiter(text) => header.waiter = Some(text).filter(|s| !s.is_empty()),
            HeaderEdit::Receiver(text) => header.receiver = text,
            HeaderEdit::ReceiverFullName(text) => header.receiver_full_name = text,
            HeaderEdit::Signature(text) => header.signature = text,
        }
    }
}

/// 日期只保留 `YYYY-MM-DD` 部分
pub fn date_only(raw: &str) -> String {
    let raw = raw.trim();
    match raw.get(..10) {
        Some(head) if NaiveDate::parse_from_str(head, "%Y-%m-%d").is_ok() => head.to_string(),
        _ => raw.to_string(),
    }
}

impl BillHeader {
    /// 编辑态下表头字段的展示值
    pub fn value_for_editing(&self, field: HeaderField) -> String {
        match field {
            HeaderField::EventDate => date_only(&self.event_date),
            HeaderField::EventId => self.event_id.map(|v| v.to_string()).unwrap_or_default(),
            HeaderField::RunningId => self.running_id.map(|v| v.to_string()).unwrap_or_default(),
            HeaderField::Venue => self.venue.clone(),
            HeaderField::EventName => self.event_name.clone(),
            HeaderField::CompanyName => self.company_name.clone(),
            HeaderField::Waiter => self.waiter.clone().unwrap_or_default(),
            HeaderField::Receiver => self.receiver.clone(),
            HeaderField::ReceiverFullName => self.receiver_full_name.clone(),
            HeaderField::Signature => self.signature.clone(),
        }
    }

    pub fn is_booth_service(&self) -> bool {
        self.bill_type.as_deref() == Some("bootservice")
    }
}
