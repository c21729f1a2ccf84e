//! Failure injection tests for the load balancer.

use std::time::Duration;
use serde_json::Value;

mod common;

use common::{client, dead_address, start_balancer, start_mock_backend, test_config};

async fn backends(client: &reqwest::Client, lb: &common::RunningBalancer) -> Vec<Value> {
    client
        .get(lb.admin_url("/backends"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_failover_to_live_backend() {
    let dead = dead_address().await;
    let (live, _live_task) = start_mock_backend("live").await;
    let lb = start_balancer(test_config(&[dead, live]), None).await;
    let client = client();

    for _ in 0..4 {
        let res = client.get(lb.url("/")).send().await.expect("Balancer unreachable");
        assert_eq!(res.status(), 200);
        assert_eq!(res.text().await.unwrap(), "live");
    }

    let statuses = backends(&client, &lb).await;
    assert_eq!(statuses[0]["address"], format!("http://{}/", dead));
    assert_eq!(statuses[0]["alive"], false, "Dead backend should be marked down");
    assert_eq!(statuses[1]["alive"], true);

    lb.stop().await;
}

#[tokio::test]
async fn test_all_backends_down_returns_503() {
    let a = dead_address().await;
    let b = dead_address().await;
    let lb = start_balancer(test_config(&[a, b]), None).await;
    let client = client();

    let res = client.get(lb.url("/anything")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    assert_eq!(res.text().await.unwrap(), "Service not available");

    // Both are down now; the next request fails without forwarding.
    let res = client.get(lb.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 503);

    lb.stop().await;
}

#[tokio::test]
async fn test_reload_through_admin_api() {
    let (a, _a_task) = start_mock_backend("a").await;
    let (b, _b_task) = start_mock_backend("b").await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let lb = start_balancer(test_config(&[a]), Some(path.clone())).await;
    let client = client();

    let res = client.get(lb.url("/")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "a");

    let res = client
        .put(lb.admin_url("/config"))
        .json(&serde_json::json!({ "port": "3000", "urls": [format!("http://{}", b)] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    for _ in 0..3 {
        let res = client.get(lb.url("/")).send().await.unwrap();
        assert_eq!(res.text().await.unwrap(), "b", "Old backend must be gone after reload");
    }

    let saved = http_balancer::config::load_config(&path).unwrap();
    assert_eq!(saved.urls, vec![format!("http://{}", b)]);

    let res = client
        .put(lb.admin_url("/config"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client.get(lb.url("/")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "b", "Rejected reload must leave the pool alone");

    lb.stop().await;
}

#[tokio::test]
async fn test_health_check_eviction_and_recovery() {
    let (b1, _b1_task) = start_mock_backend("b1").await;
    let (b2, b2_task) = start_mock_backend("b2").await;

    let mut config = test_config(&[b1, b2]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;

    let lb = start_balancer(config, None).await;
    let client = client();

    let mut b1_hits = 0;
    let mut b2_hits = 0;
    for _ in 0..10 {
        let body = client.get(lb.url("/")).send().await.unwrap().text().await.unwrap();
        if body == "b1" { b1_hits += 1; }
        if body == "b2" { b2_hits += 1; }
    }
    assert_eq!((b1_hits, b2_hits), (5, 5), "Round robin should alternate");

    b2_task.abort();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let statuses = backends(&client, &lb).await;
    assert_eq!(statuses[1]["alive"], false, "b2 should be evicted by the health checker");

    for _ in 0..5 {
        let body = client.get(lb.url("/")).send().await.unwrap().text().await.unwrap();
        assert_eq!(body, "b1", "Only b1 should be hit after b2 eviction");
    }

    let _b2_again = common::restart_mock_backend(b2, "b2").await;
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let statuses = backends(&client, &lb).await;
    assert_eq!(statuses[1]["alive"], true, "b2 should heal on a successful probe");

    lb.stop().await;
}

#[tokio::test]
async fn test_status_reports_pool() {
    let (a, _a_task) = start_mock_backend("a").await;
    let lb = start_balancer(test_config(&[a]), None).await;
    let client = client();

    let status: Value = client
        .get(lb.admin_url("/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["status"], "operational");
    assert_eq!(status["backends"], 1);
    assert_eq!(status["alive"], 1);
    assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));

    lb.stop().await;
}
