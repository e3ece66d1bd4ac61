//! 打印用送货单 (ใบส่งสินค้า/บริการ / DELIVERY ORDER) 文本版式

use std::fmt::{self, Write};

use crate::models::bill::date_only;
use crate::models::{BillHeader, EditMode, LineItem};
use crate::service::presentation::{document_title, visible_rows, Totals};

const COMPANY_LINES: &[&str] = &[
    "บริษัท เอ็น.ซี.ซี. แมนเนจเม้นท์ แอนด์ ดิเวลลอปเม้นท์ จำกัด",
    "60 Queen Sirikit National Convention Center, Ratchadapisek Road, Khlong Toei Sub-District, Khlong Toei District,",
    "Bangkok 10110, Thailand  TAX ID : 0105534007639  Head Office",
];

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// 生成打印文本；打印总是只读版式，已删除行不出现
pub fn render(header: &BillHeader, items: &[LineItem]) -> String {
    let mut out = String::new();
    // 写入 String 不会失败
    let _ = write_document(&mut out, header, items);
    out
}

fn write_document(out: &mut impl Write, header: &BillHeader, items: &[LineItem]) -> fmt::Result {
    let rows = visible_rows(items, EditMode::Viewing);
    let totals = Totals::of(items, EditMode::Viewing).formatted();

    writeln!(out, "{}", document_title(header))?;
    for line in COMPANY_LINES {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "ใบส่งสินค้า/บริการ DELIVERY ORDER")?;
    writeln!(out)?;

    writeln!(out, "Date: {}", date_only(&header.event_date))?;
    writeln!(
        out,
        "Event ID: {}",
        header.event_id.map(|v| v.to_string()).unwrap_or_default()
    )?;
    writeln!(out, "Venue: {}", header.venue)?;
    writeln!(
        out,
        "Bill No.: {}",
        header.running_id.map(|v| v.to_string()).unwrap_or_default()
    )?;
    writeln!(out, "Event Name: {}", header.event_name)?;
    writeln!(
        out,
        "Company: {}    Waiter: {}",
        header.company_name,
        header.waiter.as_deref().unwrap_or_default()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:>4}  {:<40} {:>10} {:>14} {:>16}",
        "Item", "Description", "Quantity", "Unit Price", "Amount"
    )?;
    for row in &rows {
        writeln!(
            out,
            "{:>4}  {:<40} {:>10} {:>14} {:>16}",
            row.position,
            row.description,
            row.quantity.to_string(),
            row.unit_price_display,
            row.amount_display
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{:>70} {:>16}", "Total Amount", totals.subtotal)?;
    writeln!(out, "{:>70} {:>16}", "Add : Value Added Tax (7%)", totals.vat)?;
    writeln!(out, "{:>70} {:>16}", "Total Amount Including VAT", totals.grand_total)?;
    writeln!(out)?;

    writeln!(out, "Received By : {}", or_placeholder(&header.receiver, "ผู้รับบริการ"))?;
    writeln!(
        out,
        "Full Name : {}",
        or_placeholder(&header.receiver_full_name, "ชื่อผู้รับบริการ")
    )?;
    writeln!(out, "Signature : {}", or_placeholder(&header.signature, "ลายเซ็น"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemId, ItemStatus};
    use bigdecimal::BigDecimal;

    fn item(desc: &str, qty: i64, price: i64, status: ItemStatus) -> LineItem {
        LineItem {
            id: ItemId::Persisted(desc.to_string()),
            description: desc.to_string(),
            quantity: BigDecimal::from(qty),
            unit_price: BigDecimal::from(price),
            status,
        }
    }

    #[test]
    fn printout_hides_deleted_rows_and_shows_totals() {
        let header = BillHeader {
            event_name: "Trade Fair".to_string(),
            receiver: "Khun Somchai".to_string(),
            bill_type: Some("bootservice".to_string()),
            ..Default::default()
        };
        let items = vec![
            item("Water", 10, 1500, ItemStatus::Normal),
            item("Snacks", 1, 99, ItemStatus::Delete),
        ];
        let text = render(&header, &items);

        assert!(text.starts_with("Banquet - Booth Service"));
        assert!(text.contains("Water"));
        assert!(!text.contains("Snacks"));
        assert!(text.contains("15,000.00"));
        assert!(text.contains("16,050.00"));
        assert!(text.contains("Received By : Khun Somchai"));
        assert!(text.contains("Full Name : ชื่อผู้รับบริการ"));
    }
}
