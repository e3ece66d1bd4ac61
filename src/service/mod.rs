pub mod bill_session;
pub mod line_items;
pub mod plan_filter;
pub mod plan_selection;
pub mod presentation;
pub mod registry;

pub use bill_session::{BillSession, LoadTicket, SaveTicket, Saved, StatusTicket};
pub use line_items::LineItemStore;
pub use plan_filter::PlanFilter;
pub use plan_selection::{GroupKey, PlanSelection, SelectionView};
pub use presentation::{bill_view, format_amount, BillView, Totals};
pub use registry::Registry;
