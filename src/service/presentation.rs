//! 展示层派生计算：行金额、小计、增值税、合计与金额格式化
//!
//! 全部为纯函数，每次渲染重新计算；金额精确存储，只在展示时四舍五入。

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use crate::models::flex;
use crate::models::{BillHeader, EditMode, ItemId, ItemStatus, LineItem};

/// 增值税率 7%
pub fn vat_rate() -> BigDecimal {
    BigDecimal::new(BigInt::from(7), 2)
}

pub fn line_amount(item: &LineItem) -> BigDecimal {
    &item.quantity * &item.unit_price
}

fn is_visible(item: &LineItem, mode: EditMode) -> bool {
    mode.is_editing() || !item.is_deleted()
}

/// 账单合计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    #[serde(with = "flex::amount")]
    pub subtotal: BigDecimal,
    #[serde(with = "flex::amount")]
    pub vat: BigDecimal,
    #[serde(with = "flex::amount")]
    pub grand_total: BigDecimal,
}

impl Totals {
    /// 只统计未标记删除的行
    /// 合计只覆盖当前模式下可见的行：只读模式不含已删除行，编辑模式全部计入
    pub fn of(items: &[LineItem], mode: EditMode) -> Self {
        let subtotal = items
            .iter()
            .filter(|item| is_visible(item, mode))
            .fold(BigDecimal::zero(), |acc, item| acc + line_amount(item));
        let vat = &subtotal * vat_rate();
        let grand_total = &subtotal + &vat;
        Self {
            subtotal,
            vat,
            grand_total,
        }
    }

    pub fn formatted(&self) -> FormattedTotals {
        FormattedTotals {
            subtotal: format_amount(&self.subtotal),
            vat: format_amount(&self.vat),
            grand_total: format_amount(&self.grand_total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedTotals {
    pub subtotal: String,
    pub vat: String,
    pub grand_total: String,
}

/// 四舍五入到分 (远离零)，返回以分为单位的整数
fn to_cents(value: &BigDecimal) -> BigInt {
    let shifted = value * BigDecimal::from(100);
    let half = BigDecimal::new(BigInt::from(5), 1);
    let nudged = if shifted < BigDecimal::zero() {
        shifted - half
    } else {
        shifted + half
    };
    let (cents, _) = nudged.with_scale(0).into_bigint_and_exponent();
    cents
}

/// 两位小数、千分位逗号，例如 `1,234.50`
pub fn format_amount(value: &BigDecimal) -> String {
    let cents = to_cents(value);
    let negative = cents < BigInt::from(0);
    let digits = if negative { (-cents).to_string() } else { cents.to_string() };
    let digits = format!("{:0>3}", digits);
    let (int_part, frac_part) = digits.split_at(digits.len() - 2);

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// 渲染用的一行明细
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    /// 展示序号，从 1 开始
    pub position: usize,
    /// 在存储中的下标，编辑操作用它定位
    pub index: usize,
    pub id: ItemId,
    pub description: String,
    #[serde(with = "flex::amount")]
    pub quantity: BigDecimal,
    #[serde(with = "flex::amount")]
    pub unit_price: BigDecimal,
    #[serde(with = "flex::amount")]
    pub amount: BigDecimal,
    pub unit_price_display: String,
    pub amount_display: String,
    pub deleted: bool,
    pub is_new: bool,
}

/// 按模式筛选可见行
pub fn visible_rows(items: &[LineItem], mode: EditMode) -> Vec<ItemRow> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| is_visible(item, mode))
        .enumerate()
        .map(|(pos, (index, item))| {
            let amount = line_amount(item);
            ItemRow {
                position: pos + 1,
                index,
                id: item.id.clone(),
                description: item.description.clone(),
                quantity: item.quantity.clone(),
                unit_price: item.unit_price.clone(),
                unit_price_display: format_amount(&item.unit_price),
                amount_display: format_amount(&amount),
                amount,
                deleted: item.is_deleted(),
                is_new: item.status == ItemStatus::New,
            }
        })
        .collect()
}

/// 账单详情视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillView {
    pub mode: EditMode,
    pub header: BillHeader,
    pub title: &'static str,
    pub rows: Vec<ItemRow>,
    pub totals: Totals,
    pub formatted: FormattedTotals,
}

pub fn bill_view(header: &BillHeader, items: &[LineItem], mode: EditMode) -> BillView {
    let totals = Totals::of(items, mode);
    BillView {
        mode,
        header: header.clone(),
        title: document_title(header),
        rows: visible_rows(items, mode),
        formatted: totals.formatted(),
        totals,
    }
}

pub fn document_title(header: &BillHeader) -> &'static str {
    if header.is_booth_service() {
        "Banquet - Booth Service"
    } else {
        "Banquet"
    }
}
