pub mod delivery_order;
pub mod spreadsheet;

pub use delivery_order::render as render_delivery_order;
pub use spreadsheet::export_csv;
