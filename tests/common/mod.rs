//! 测试用远端服务：在本机随机端口上启动的 axum 假服务，记录收到的写请求

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Form, Json, State},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use longbill_desk::config::RemoteConfig;
use longbill_desk::{build_router, AppState, HttpRemote};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
pub struct FakeBackend {
    pub saved: Mutex<Vec<Value>>,
    pub generated: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<Value>>,
    pub deleted: Mutex<Vec<String>>,
    pub reject_saves: AtomicBool,
}

impl FakeBackend {
    pub fn reject_saves(&self, reject: bool) {
        self.reject_saves.store(reject, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Vec<Value> {
        self.saved.lock().unwrap().clone()
    }
}

fn success() -> Json<Value> {
    Json(json!({ "status": "success" }))
}

async fn bill_types() -> Json<Value> {
    Json(json!([
        { "id": "1", "type": "banquet" },
        { "id": "2", "type": "bootservice" }
    ]))
}

async fn meal_plans(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    let plans = vec![
        json!({
            "id": "10", "meal_plan_name": "Motor Expo", "file_name": "motor.xlsx",
            "create_at": "2024-03-01 09:00:00", "long_bill_count": 2, "bill_type": "banquet"
        }),
        json!({
            "id": "11", "meal_plan_name": "Book Fair", "file_name": "books.xlsx",
            "create_at": "2024-04-15 10:30:00", "long_bill_count": "0", "bill_type": "bootservice"
        }),
    ];
    let plans: Vec<Value> = match form.get("bill_type") {
        Some(bill_type) => plans
            .into_iter()
            .filter(|p| p["bill_type"] == json!(bill_type))
            .collect(),
        None => plans,
    };
    Json(Value::Array(plans))
}

async fn plan_items() -> Json<Value> {
    Json(json!([
        {
            "id": "p1", "meal_plan_id": "10", "event_date": "2024-03-05", "event_id": 501,
            "event_name": "Opening", "company_name": "ACME", "item_description": "Coffee",
            "quantity": 10, "price": "35.00"
        },
        {
            "id": "p2", "meal_plan_id": "10", "event_date": "2024-03-05", "event_id": 501,
            "event_name": "Opening", "company_name": "ACME", "item_description": "Lunch",
            "quantity": 10, "price": 450
        },
        {
            "id": "p3", "meal_plan_id": "10", "event_date": "2024-03-06", "event_id": 502,
            "event_name": "Day 2", "company_name": "Globex", "item_description": "Dinner",
            "quantity": "5", "price": "800"
        }
    ]))
}

async fn bill_list() -> Json<Value> {
    Json(json!([
        {
            "id": "42", "meal_plan_id": "10", "running_id": "1001", "bill_type": "banquet",
            "event_date": "2024-03-05T00:00:00", "event_id": 501, "venue": "Hall A",
            "event_name": "Opening", "company_name": "ACME", "status": 1
        }
    ]))
}

async fn bill_items(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match form.get("longbill_id").map(String::as_str) {
        Some("42") => (
            StatusCode::OK,
            Json(json!([
                { "id": "1", "item_description": "Coffee break", "quantity": 2, "price": "100.50" },
                { "id": "2", "item_description": "Water", "quantity": "1", "price": 50 }
            ])),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
    }
}

async fn save_bill(State(backend): State<Arc<FakeBackend>>, Json(body): Json<Value>) -> Json<Value> {
    if backend.reject_saves.load(Ordering::SeqCst) {
        return Json(json!({ "status": "failure", "message": "Bill is locked" }));
    }
    backend.saved.lock().unwrap().push(body);
    success()
}

async fn generate(State(backend): State<Arc<FakeBackend>>, Json(body): Json<Value>) -> Json<Value> {
    backend.generated.lock().unwrap().push(body);
    success()
}

async fn delete_plan(
    State(backend): State<Arc<FakeBackend>>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let id = form.get("meal_plan_id").cloned().unwrap_or_default();
    backend.deleted.lock().unwrap().push(id);
    success()
}

async fn upload(State(backend): State<Arc<FakeBackend>>, Json(body): Json<Value>) -> Json<Value> {
    backend.uploads.lock().unwrap().push(body);
    success()
}

/// 启动假远端，返回其状态与指向它的客户端
pub async fn spawn_backend() -> (Arc<FakeBackend>, HttpRemote) {
    let backend = Arc::new(FakeBackend::default());
    let router = Router::new()
        .route("/QueryBillType", get(bill_types))
        .route("/QueryMealPlanList", post(meal_plans))
        .route("/QueryMealPlanItem", post(plan_items))
        .route("/QueryLongBillList", post(bill_list))
        .route("/QueryLongBillItems", post(bill_items))
        .route("/LongBillData", post(save_bill))
        .route("/GenerateLongBillFromJson", post(generate))
        .route("/DeleteMealPlan", post(delete_plan))
        .route("/UploadMealPlan", post(upload))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let remote = HttpRemote::new(&RemoteConfig {
        base_url: format!("http://{}/", addr),
        timeout_secs: 5,
    })
    .unwrap();
    (backend, remote)
}

/// 假远端 + 应用路由
pub async fn spawn_app() -> (Arc<FakeBackend>, Router) {
    let (backend, remote) = spawn_backend().await;
    let app = build_router(AppState::new(Arc::new(remote)));
    (backend, app)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let (status, bytes) = send_raw(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}
