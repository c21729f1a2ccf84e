//! Load testing for the load balancer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

mod common;

#[tokio::test]
async fn test_load_spreads_evenly() {
    // 1. Two counting backends
    let hits = [Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0))];
    let mut addrs = Vec::new();
    let mut tasks = Vec::new();
    for counter in &hits {
        let counter = counter.clone();
        let (addr, task) = common::start_programmable_backend(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (200, "Hello from backend".to_string())
            }
        })
        .await;
        addrs.push(addr);
        tasks.push(task);
    }

    // 2. Balancer in front of them
    let lb = common::start_balancer(common::test_config(&addrs), None).await;

    // 3. Run load
    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut workers = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = lb.url("/");
        workers.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        latencies.push(req_start.elapsed());
                    }
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for worker in workers {
        all_latencies.extend(worker.await.unwrap());
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    assert_eq!(all_latencies.len(), total_requests, "Every request should succeed");

    // 4. Round robin with both backends alive splits exactly in half
    let a = hits[0].load(Ordering::SeqCst);
    let b = hits[1].load(Ordering::SeqCst);
    assert_eq!(a + b, total_requests);
    assert_eq!(a, b, "Uneven spread: {} vs {}", a, b);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", rps);
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    lb.stop().await;
}
