pub mod handlers;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::remote::RemoteService;
use crate::service::{BillSession, PlanSelection, Registry};

pub use handlers::*;

/// 共享状态：远端服务与两类会话表
#[derive(Clone)]
pub struct AppState {
    pub remote: Arc<dyn RemoteService>,
    pub sessions: Registry<BillSession>,
    pub selections: Registry<PlanSelection>,
}

impl AppState {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self {
            remote,
            sessions: Registry::new(),
            selections: Registry::new(),
        }
    }
}

/// 构建全部路由
pub fn build_router(state: AppState) -> Router {
    // 餐饮计划
    let plan_routes = Router::new()
        .route("/api/plan-types", get(list_plan_types))
        .route("/api/plans", get(list_plans).post(upload_plan))
        .route("/api/plans/:plan_id", delete(delete_plan))
        .route("/api/plans/:plan_id/bills", get(list_bills));

    // 计划明细勾选
    let selection_routes = Router::new()
        .route("/api/selections", post(open_selection))
        .route(
            "/api/selections/:id",
            get(get_selection).delete(close_selection),
        )
        .route("/api/selections/:id/toggle", post(toggle_item))
        .route("/api/selections/:id/group", post(toggle_group))
        .route("/api/selections/:id/all", post(toggle_all))
        .route("/api/selections/:id/items/:index", patch(edit_plan_item))
        .route("/api/selections/:id/generate", post(generate_bill));

    // 长账单编辑
    let session_routes = Router::new()
        .route("/api/sessions", post(open_session))
        .route("/api/sessions/:id", get(get_session).delete(close_session))
        .route("/api/sessions/:id/edit", post(begin_edit))
        .route("/api/sessions/:id/cancel", post(cancel_edit))
        .route("/api/sessions/:id/items", post(add_item))
        .route("/api/sessions/:id/items/:index", patch(edit_item))
        .route("/api/sessions/:id/items/:index/delete", post(delete_item))
        .route("/api/sessions/:id/items/:index/undo", post(undo_delete_item))
        .route("/api/sessions/:id/header", patch(edit_header))
        .route("/api/sessions/:id/status", put(set_status))
        .route("/api/sessions/:id/save", post(save_session))
        .route("/api/sessions/:id/print", get(print_session))
        .route("/api/sessions/:id/export", get(export_session));

    Router::new()
        .route("/health", get(health_check))
        .merge(plan_routes)
        .merge(selection_routes)
        .merge(session_routes)
        .layer(ServiceBuilder::new())
        .with_state(state)
}
