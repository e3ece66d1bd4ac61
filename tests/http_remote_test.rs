mod common;

use bigdecimal::BigDecimal;
use common::spawn_backend;
use longbill_desk::config::RemoteConfig;
use longbill_desk::models::{BillRecord, BillStatus, ItemStatus};
use longbill_desk::{HttpRemote, RemoteError, RemoteService};
use std::str::FromStr;

#[tokio::test]
async fn test_fetch_items_decodes_loose_fields() {
    let (_backend, remote) = spawn_backend().await;
    let items = remote.fetch_items("42").await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.as_str(), "1");
    assert_eq!(items[0].unit_price, BigDecimal::from_str("100.50").unwrap());
    assert_eq!(items[1].quantity, BigDecimal::from(1));
    assert_eq!(items[1].status, ItemStatus::Normal);
}

#[tokio::test]
async fn test_bill_list_and_plan_types() {
    let (_backend, remote) = spawn_backend().await;

    let bills = remote.fetch_bill_list("10").await.unwrap();
    assert_eq!(bills[0].running_id, Some(1001));
    assert_eq!(bills[0].status, Some(BillStatus::New));
    assert_eq!(bills[0].meal_plan_id, Some(10));

    let types = remote.fetch_plan_types().await.unwrap();
    assert_eq!(types[0].name, "banquet");

    let plans = remote.fetch_meal_plans(Some("banquet")).await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].long_bill_count, Some(2));
}

#[tokio::test]
async fn test_rejected_envelope_carries_server_message() {
    let (backend, remote) = spawn_backend().await;
    backend.reject_saves(true);

    let err = remote.save_bill(&BillRecord::default()).await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Rejected {
            message: "Bill is locked".to_string()
        }
    );
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let (_backend, remote) = spawn_backend().await;
    let err = remote.fetch_items("unknown").await.unwrap_err();
    assert_eq!(err, RemoteError::Http { status: 500 });
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_unreachable_remote_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = HttpRemote::new(&RemoteConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
    })
    .unwrap();
    let err = remote.fetch_plan_types().await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
}
