//! Wall-clock behaviour of the retry loop against a real socket.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use records_gateway::upstream::{ApiResult, PatientsClient};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_retry_delays_grow_exponentially() {
    let call_count = Arc::new(AtomicU32::new(0));
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    let cc = call_count.clone();
    let log = arrivals.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        let log = log.clone();
        async move {
            log.lock().unwrap().push(Instant::now());
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503, "Service Unavailable".into())
            } else {
                (200, r#"[{"id":1}]"#.into())
            }
        }
    })
    .await;

    let upstream = common::upstream_config(&format!("http://{}", addr));
    let client = PatientsClient::new(&upstream, &common::retry_config()).unwrap();

    let result = client.fetch_patients().await;

    assert_eq!(result, ApiResult::Success(json!([{"id": 1}])));
    assert_eq!(call_count.load(Ordering::SeqCst), 3, "Should have attempted 3 times");

    let arrivals = arrivals.lock().unwrap();
    let first_gap = arrivals[1] - arrivals[0];
    let second_gap = arrivals[2] - arrivals[1];
    assert!(first_gap >= Duration::from_millis(100), "first gap {:?}", first_gap);
    assert!(first_gap < Duration::from_millis(600), "first gap {:?}", first_gap);
    assert!(second_gap >= Duration::from_millis(200), "second gap {:?}", second_gap);
    assert!(second_gap < Duration::from_millis(700), "second gap {:?}", second_gap);
}

#[tokio::test]
async fn test_all_attempts_fail() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (502, "Bad Gateway".into())
        }
    })
    .await;

    let upstream = common::upstream_config(&format!("http://{}", addr));
    let client = PatientsClient::new(&upstream, &common::retry_config()).unwrap();

    let result = client.fetch_patients().await;

    assert_eq!(
        result.into_json(),
        json!({"error": "the server responded with status 502", "code": 502})
    );
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_concurrent_calls_keep_separate_budgets() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (500, "boom".into())
        }
    })
    .await;

    let upstream = common::upstream_config(&format!("http://{}", addr));
    let client = PatientsClient::new(&upstream, &common::retry_config()).unwrap();

    let (a, b) = tokio::join!(client.fetch_patients(), client.fetch_patients());

    assert!(!a.is_success());
    assert!(!b.is_success());
    assert_eq!(call_count.load(Ordering::SeqCst), 6);
}
