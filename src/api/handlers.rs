use crate::error::{AppError, SessionError};
use crate::export;
use crate::models::{
    BillStatus, BillSummary, HeaderEdit, ItemEdit, MealPlan, PlanItemEdit, PlanType, PlanUpload,
};
use crate::service::{BillSession, BillView, PlanFilter, PlanSelection, SelectionView};
use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;

/// 通用回执
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

// ---------------------------------------------------------------------------
// 餐饮计划
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    pub bill_type: Option<String>,
    pub term: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plan_types: Vec<PlanType>,
    pub plans: Vec<MealPlan>,
}

pub async fn list_plan_types(State(state): State<AppState>) -> Result<Json<Vec<PlanType>>, AppError> {
    Ok(Json(state.remote.fetch_plan_types().await?))
}

/// 计划类型与计划列表并发拉取，列表按关键字和日期过滤
pub async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<PlansResponse>, AppError> {
    let (plan_types, plans) = futures::try_join!(
        state.remote.fetch_plan_types(),
        state.remote.fetch_meal_plans(query.bill_type.as_deref()),
    )?;

    let filter = PlanFilter::new(
        query.term.as_deref(),
        query.from.as_deref(),
        query.to.as_deref(),
    );
    let plans = filter.apply(plans);
    tracing::info!("Meal plans loaded: {} after filtering", plans.len());

    Ok(Json(PlansResponse { plan_types, plans }))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub name: String,
    pub file_name: String,
    pub bill_type: Option<String>,
}

/// 上传计划文件，请求体为文件原始字节
pub async fn upload_plan(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ActionResponse>, AppError> {
    let upload = PlanUpload {
        name: query.name,
        bill_type: query.bill_type.filter(|t| !t.is_empty()),
        file_name: query.file_name,
        content: body.to_vec(),
    };
    if !upload.is_complete() {
        return Err(AppError::InvalidUpload(
            "plan name and file are required".to_string(),
        ));
    }
    state.remote.upload_plan(&upload).await?;
    Ok(ActionResponse::ok("Meal plan uploaded and list refreshed."))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    state.remote.delete_plan(&plan_id).await?;
    tracing::info!("Meal plan {} deleted", plan_id);
    Ok(ActionResponse::ok("Meal plan deleted."))
}

pub async fn list_bills(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<Vec<BillSummary>>, AppError> {
    Ok(Json(state.remote.fetch_bill_list(&plan_id).await?))
}

// ---------------------------------------------------------------------------
// 计划明细勾选 -> 生成长账单
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OpenSelectionRequest {
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selection_id: Uuid,
    pub view: SelectionView,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub item_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub group: usize,
    pub checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckAllRequest {
    pub checked: bool,
}

fn update_selection<R>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut PlanSelection) -> Result<R, crate::error::SelectionError>,
) -> Result<R, AppError> {
    state
        .selections
        .update(&id, f)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?
        .map_err(AppError::from)
}

fn selection_view(state: &AppState, id: Uuid) -> Result<Json<SelectionResponse>, AppError> {
    let view = state
        .selections
        .read(&id, |s| s.view())
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
    Ok(Json(SelectionResponse {
        selection_id: id,
        view,
    }))
}

pub async fn open_selection(
    State(state): State<AppState>,
    Json(req): Json<OpenSelectionRequest>,
) -> Result<(StatusCode, Json<SelectionResponse>), AppError> {
    let items = state.remote.fetch_plan_items(&req.plan_id).await?;
    let selection = PlanSelection::new(req.plan_id, items);
    let view = selection.view();
    let selection_id = state.selections.insert(selection);
    Ok((
        StatusCode::CREATED,
        Json(SelectionResponse { selection_id, view }),
    ))
}

pub async fn get_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SelectionResponse>, AppError> {
    selection_view(&state, id)
}

pub async fn toggle_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    update_selection(&state, id, |s| s.toggle(&req.item_id))?;
    selection_view(&state, id)
}

pub async fn toggle_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GroupRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    update_selection(&state, id, |s| s.set_group(req.group, req.checked))?;
    selection_view(&state, id)
}

pub async fn toggle_all(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckAllRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    update_selection(&state, id, |s| {
        s.set_all(req.checked);
        Ok(())
    })?;
    selection_view(&state, id)
}

pub async fn edit_plan_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(edit): Json<PlanItemEdit>,
) -> Result<Json<SelectionResponse>, AppError> {
    update_selection(&state, id, |s| s.edit_item(index, edit))?;
    selection_view(&state, id)
}

/// 生成成功后关闭勾选会话
pub async fn generate_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    let selection = state
        .selections
        .read(&id, |s| s.clone())
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;

    let count = selection.generate(state.remote.as_ref()).await?;
    state.selections.remove(&id);
    Ok(ActionResponse::ok(format!(
        "Long bill generated successfully from {} items.",
        count
    )))
}

pub async fn close_selection(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.selections.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

// ---------------------------------------------------------------------------
// 长账单编辑会话
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub view: BillView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub refresh_list: bool,
    pub view: BillView,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: BillStatus,
}

fn update_session<R>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut BillSession) -> Result<R, SessionError>,
) -> Result<R, AppError> {
    state
        .sessions
        .update(&id, f)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?
        .map_err(AppError::from)
}

/// 请求返回时会话可能已被关闭，此时丢弃响应
fn finish_on_session<R>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut BillSession) -> Result<R, SessionError>,
) -> Result<R, AppError> {
    update_session(state, id, f).map_err(|e| {
        if matches!(e, AppError::SessionNotFound(_)) {
            tracing::warn!("Session {} closed before response arrived, ignoring", id);
        }
        e
    })
}

fn session_view(state: &AppState, id: Uuid) -> Result<Json<BillView>, AppError> {
    state
        .sessions
        .read(&id, |s| s.view())
        .map(Json)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

/// 打开账单：同一账单只保留最后打开的会话，随后拉取明细
pub async fn open_session(
    State(state): State<AppState>,
    Json(summary): Json<BillSummary>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    if !summary.id.is_empty() {
        let evicted = state.sessions.evict(|s| s.bill_id() == summary.id);
        if evicted > 0 {
            tracing::info!("Replaced {} open session(s) for bill {}", evicted, summary.id);
        }
    }

    let (session, ticket) = BillSession::open(summary);
    let session_id = state.sessions.insert(session);
    tracing::info!("Opened session {} for bill {:?}", session_id, ticket.bill_id);

    let mut notice = None;
    if !ticket.bill_id.is_empty() {
        let outcome = state.remote.fetch_items(&ticket.bill_id).await;
        match finish_on_session(&state, session_id, |s| {
            s.finish_load(ticket.generation, outcome)
        }) {
            Ok(()) => {}
            Err(AppError::Session(SessionError::Remote(e))) => {
                notice = Some(format!("Failed to fetch bill items: {}", e));
            }
            Err(e) => return Err(e),
        }
    }

    let Json(view) = session_view(&state, session_id)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            view,
            notice,
        }),
    ))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillView>, AppError> {
    session_view(&state, id)
}

pub async fn close_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.sessions.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

pub async fn begin_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.begin_edit())?;
    session_view(&state, id)
}

pub async fn cancel_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.cancel_edit())?;
    session_view(&state, id)
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.add_item())?;
    session_view(&state, id)
}

pub async fn edit_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(edit): Json<ItemEdit>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.edit_item(index, edit))?;
    session_view(&state, id)
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.mark_deleted(index))?;
    session_view(&state, id)
}

pub async fn undo_delete_item(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.undo_delete(index))?;
    session_view(&state, id)
}

pub async fn edit_header(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<HeaderEdit>,
) -> Result<Json<BillView>, AppError> {
    update_session(&state, id, |s| s.edit_header(edit))?;
    session_view(&state, id)
}

/// 状态变更立即持久化，与字段编辑的保存相互独立
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<BillView>, AppError> {
    let ticket = update_session(&state, id, |s| Ok(s.set_status(req.status)))?;
    if let Some(ticket) = ticket {
        let outcome = state.remote.save_bill(&ticket.payload).await;
        finish_on_session(&state, id, |s| s.finish_status(ticket, outcome))?;
    }
    session_view(&state, id)
}

pub async fn save_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaveResponse>, AppError> {
    let ticket = update_session(&state, id, |s| s.begin_save())?;
    let outcome = state.remote.save_bill(&ticket.payload).await;
    let saved = finish_on_session(&state, id, |s| s.finish_save(ticket, outcome))?;

    let Json(view) = session_view(&state, id)?;
    Ok(Json(SaveResponse {
        success: true,
        message: "Long bill saved successfully.".to_string(),
        refresh_list: saved.refresh_list,
        view,
    }))
}

pub async fn print_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let text = state
        .sessions
        .read(&id, |s| export::render_delivery_order(s.header(), s.items()))
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}

pub async fn export_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (file_name, bytes) = state
        .sessions
        .read(&id, |s| {
            let name = format!("longbill-{}.csv", s.bill_id());
            (name, export::export_csv(s.header(), s.items()))
        })
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
    let bytes = bytes.map_err(|e| AppError::Export(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
