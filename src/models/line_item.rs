use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::flex;

/// 本地新增、尚未保存的明细行ID前缀
pub const TEMP_ID_PREFIX: &str = "temp-";

/// 明细行ID：远端持久化ID，或本地生成的临时ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemId {
    Persisted(String),
    Temporary(String),
}

impl ItemId {
    pub fn is_temporary(&self) -> bool {
        matches!(self, ItemId::Temporary(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemId::Persisted(id) | ItemId::Temporary(id) => id,
        }
    }

    fn from_raw(raw: String) -> Self {
        if raw.starts_with(TEMP_ID_PREFIX) {
            ItemId::Temporary(raw)
        } else {
            ItemId::Persisted(raw)
        }
    }
}

impl Default for ItemId {
    fn default() -> Self {
        ItemId::Persisted(String::new())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        flex::text(deserializer).map(ItemId::from_raw)
    }
}

/// 明细行状态
///
/// `Normal` 表示未改动的已持久化行，线上不携带 status 字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    #[default]
    Normal,
    New,
    Delete,
}

impl ItemStatus {
    pub fn is_normal(&self) -> bool {
        matches!(self, ItemStatus::Normal)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, ItemStatus::Delete)
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            ItemStatus::Normal => "normal",
            ItemStatus::New => "new",
            ItemStatus::Delete => "delete",
        })
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match flex::opt_text(deserializer)?.as_deref() {
            Some("new") => ItemStatus::New,
            Some("delete") => ItemStatus::Delete,
            _ => ItemStatus::Normal,
        })
    }
}

/// 长账单明细行
///
/// 行金额 = quantity * unit_price，只做派生计算，不存储。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: ItemId,
    #[serde(rename = "item_description", default, deserialize_with = "flex::text")]
    pub description: String,
    #[serde(with = "flex::amount", default)]
    pub quantity: BigDecimal,
    #[serde(rename = "price", with = "flex::amount", default)]
    pub unit_price: BigDecimal,
    #[serde(default, skip_serializing_if = "ItemStatus::is_normal")]
    pub status: ItemStatus,
}

impl LineItem {
    /// 本地新增的空白行
    pub fn blank(id: ItemId) -> Self {
        Self {
            id,
            description: String::new(),
            quantity: BigDecimal::from(0),
            unit_price: BigDecimal::from(0),
            status: ItemStatus::New,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }
}

/// 明细行可编辑字段，值为用户原始输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ItemEdit {
    Description(String),
    Quantity(String),
    UnitPrice(String),
}

impl ItemEdit {
    /// 应用到明细行；数量与单价的非数字输入归零
    pub fn apply(self, item: &mut LineItem) {
        match self {
            ItemEdit::Description(text) => item.description = text,
            ItemEdit::Quantity(raw) => item.quantity = flex::coerce_amount(&raw),
            ItemEdit::UnitPrice(raw) => item.unit_price = flex::coerce_amount(&raw),
        }
    }
}
