pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod remote;
pub mod service;

pub use api::{build_router, AppState};
pub use config::AppConfig;
pub use error::{AppError, RemoteError, SessionError};
pub use remote::{HttpRemote, RemoteService};
pub use service::{BillSession, PlanSelection};
