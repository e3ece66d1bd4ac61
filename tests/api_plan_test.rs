mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{send, send_raw, spawn_app};
use serde_json::{json, Value};

fn plan_names(body: &Value) -> Vec<String> {
    body["plans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["meal_plan_name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (_backend, app) = spawn_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_list_plans_with_filters() {
    let (_backend, app) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/plans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan_types"].as_array().unwrap().len(), 2);
    assert_eq!(body["plan_types"][1]["type"], "bootservice");
    assert_eq!(plan_names(&body), vec!["Motor Expo", "Book Fair"]);

    let (_, body) = send(&app, "GET", "/api/plans?bill_type=bootservice", None).await;
    assert_eq!(plan_names(&body), vec!["Book Fair"]);

    let (_, body) = send(&app, "GET", "/api/plans?term=MOTOR", None).await;
    assert_eq!(plan_names(&body), vec!["Motor Expo"]);

    let (_, body) = send(&app, "GET", "/api/plans?from=2024-04-01", None).await;
    assert_eq!(plan_names(&body), vec!["Book Fair"]);

    let (_, body) = send(&app, "GET", "/api/plans?from=2024-01-01&to=2024-03-31", None).await;
    assert_eq!(plan_names(&body), vec!["Motor Expo"]);
}

#[tokio::test]
async fn test_upload_sends_base64_file() {
    let (backend, app) = spawn_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/plans?name=Gala&file_name=gala.xlsx&bill_type=banquet")
        .body(Body::from("hello"))
        .unwrap();
    let (status, _) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let uploads = backend.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["meal_plan_name"], "Gala");
    assert_eq!(uploads[0]["file_name"], "gala.xlsx");
    assert_eq!(uploads[0]["bill_type"], "banquet");
    assert_eq!(uploads[0]["file"], "aGVsbG8=");
}

#[tokio::test]
async fn test_upload_requires_name_and_file() {
    let (backend, app) = spawn_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/plans?name=&file_name=gala.xlsx")
        .body(Body::from("data"))
        .unwrap();
    let (status, _) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .method("POST")
        .uri("/api/plans?name=Gala&file_name=gala.xlsx")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(backend.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_plan_and_list_bills() {
    let (backend, app) = spawn_app().await;

    let (status, body) = send(&app, "DELETE", "/api/plans/10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(*backend.deleted.lock().unwrap(), vec!["10".to_string()]);

    let (status, body) = send(&app, "GET", "/api/plans/10/bills", None).await;
    assert_eq!(status, StatusCode::OK);
    let bills = body.as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0]["id"], "42");
    assert_eq!(bills[0]["running_id"], 1001);
    assert_eq!(bills[0]["status"], 1);
}

#[tokio::test]
async fn test_selection_groups_and_generate() {
    let (backend, app) = spawn_app().await;

    let (status, body) = send(&app, "POST", "/api/selections", Some(json!({ "plan_id": "10" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["selection_id"].as_str().unwrap().to_string();
    let view = &body["view"];
    assert_eq!(view["total_items"], 3);
    assert_eq!(view["total_price_display"], "1,285.00");
    assert_eq!(view["groups"].as_array().unwrap().len(), 2);
    assert_eq!(view["groups"][0]["key"], "2024-03-05_501_Opening_ACME");
    assert_eq!(view["groups"][1]["index"], 1);

    let base = format!("/api/selections/{}", id);

    // 空选择不能生成
    let (status, _) = send(&app, "POST", &format!("{}/generate", base), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(
        &app,
        "POST",
        &format!("{}/group", base),
        Some(json!({ "group": 0, "checked": true })),
    )
    .await;
    assert_eq!(body["view"]["selected_count"], 2);
    assert_eq!(body["view"]["groups"][0]["all_selected"], true);
    assert_eq!(body["view"]["groups"][1]["some_selected"], false);

    let (_, body) = send(&app, "POST", &format!("{}/toggle", base), Some(json!({ "item_id": "p1" }))).await;
    assert_eq!(body["view"]["selected_count"], 1);
    assert_eq!(body["view"]["groups"][0]["all_selected"], false);
    assert_eq!(body["view"]["groups"][0]["some_selected"], true);

    let (status, _) = send(&app, "POST", &format!("{}/toggle", base), Some(json!({ "item_id": "nope" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(
        &app,
        "PATCH",
        &format!("{}/items/1", base),
        Some(json!({ "field": "item_description", "value": "Set lunch" })),
    )
    .await;
    assert_eq!(body["view"]["groups"][0]["rows"][1]["item"]["item_description"], "Set lunch");

    let (status, body) = send(&app, "POST", &format!("{}/generate", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let generated = backend.generated.lock().unwrap().clone();
    assert_eq!(generated.len(), 1);
    let items = generated[0]["MealPlanItem"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "p2");
    assert_eq!(items[0]["item_description"], "Set lunch");

    // 生成成功后会话关闭
    let (status, _) = send(&app, "GET", &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_select_all_then_clear() {
    let (_backend, app) = spawn_app().await;
    let (_, body) = send(&app, "POST", "/api/selections", Some(json!({ "plan_id": "10" }))).await;
    let base = format!("/api/selections/{}", body["selection_id"].as_str().unwrap());

    let (_, body) = send(&app, "POST", &format!("{}/all", base), Some(json!({ "checked": true }))).await;
    assert_eq!(body["view"]["selected_count"], 3);
    let (_, body) = send(&app, "POST", &format!("{}/all", base), Some(json!({ "checked": false }))).await;
    assert_eq!(body["view"]["selected_count"], 0);

    let (status, _) = send(&app, "DELETE", &base, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
