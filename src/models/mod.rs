pub mod bill;
pub mod envelope;
pub mod flex;
pub mod line_item;
pub mod meal_plan;

pub use bill::{BillHeader, BillRecord, BillStatus, BillSummary, EditMode, HeaderEdit, HeaderField};
pub use envelope::Envelope;
pub use line_item::{ItemEdit, ItemId, ItemStatus, LineItem, TEMP_ID_PREFIX};
pub use meal_plan::{MealPlan, MealPlanItem, PlanItemEdit, PlanType, PlanUpload};
