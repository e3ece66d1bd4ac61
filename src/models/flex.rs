//! 远端数据字段宽松解析
//!
//! 远端返回的字段类型并不稳定：金额可能是数字、数字字符串或 null，
//! ID 可能是数字也可能是字符串。这里统一收口。

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// 金额/数量文本的最大长度
const MAX_AMOUNT_LEN: usize = 32;

/// 只接受普通十进制写法 (`12`、`12.50`、`.5`)，拒绝科学计数法和符号
fn is_plain_decimal(raw: &str) -> bool {
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw, ""));
    raw.len() <= MAX_AMOUNT_LEN
        && !(int_part.is_empty() && frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// 原始输入转为非负金额/数量：非数字、负数、超长或指数写法一律为 0
pub fn coerce_amount(raw: &str) -> BigDecimal {
    let raw = raw.trim();
    if !is_plain_decimal(raw) {
        return BigDecimal::zero();
    }
    match BigDecimal::from_str(raw) {
        Ok(v) if v >= BigDecimal::zero() => v,
        _ => BigDecimal::zero(),
    }
}

/// 原始输入转为可选整数：空串或非数字为 None
pub fn coerce_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn value_to_amount(value: Value) -> BigDecimal {
    match value {
        Value::Number(n) => coerce_amount(&n.to_string()),
        Value::String(s) => coerce_amount(&s),
        _ => BigDecimal::zero(),
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// 金额字段：读入宽松，写出为 JSON 数字
pub mod amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64().unwrap_or(0.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.map(value_to_amount).unwrap_or_else(BigDecimal::zero))
    }
}

/// 文本字段：null 视为空串，数字转为字符串
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text).unwrap_or_default())
}

/// 可选文本字段：null 或空串为 None
pub fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text).filter(|s| !s.is_empty()))
}

/// 可选整数字段：接受数字或数字字符串
pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => coerce_int(&s),
        _ => None,
    })
}
