use csv::Writer;

use crate::models::bill::date_only;
use crate::models::{BillHeader, EditMode, LineItem};
use crate::service::presentation::{visible_rows, Totals};

/// 导出账单为 CSV ("Export to Excel")：表头信息、可见明细、合计
pub fn export_csv(
    header: &BillHeader,
    items: &[LineItem],
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = Writer::from_writer(Vec::new());

    writer.write_record(["Bill No.", "Event ID", "Event Name", "Company", "Date"])?;
    writer.write_record([
        header.running_id.map(|v| v.to_string()).unwrap_or_default(),
        header.event_id.map(|v| v.to_string()).unwrap_or_default(),
        header.event_name.clone(),
        header.company_name.clone(),
        date_only(&header.event_date),
    ])?;
    writer.write_record([""; 5])?;

    writer.write_record(["Item", "Description", "Quantity", "Unit Price", "Amount"])?;
    for row in visible_rows(items, EditMode::Viewing) {
        writer.write_record([
            row.position.to_string(),
            row.description,
            row.quantity.to_string(),
            row.unit_price_display,
            row.amount_display,
        ])?;
    }

    let totals = Totals::of(items, EditMode::Viewing).formatted();
    writer.write_record(["", "", "", "Total Amount", totals.subtotal.as_str()])?;
    writer.write_record(["", "", "", "Add : Value Added Tax (7%)", totals.vat.as_str()])?;
    writer.write_record([
        "",
        "",
        "",
        "Total Amount Including VAT",
        totals.grand_total.as_str(),
    ])?;

    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}
