//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use http_balancer::config::BalancerConfig;
use http_balancer::{Balancer, Shutdown};

/// A mock backend that answers every request with a fixed body.
pub async fn start_mock_backend(response: &'static str) -> (SocketAddr, JoinHandle<()>) {
    start_programmable_backend(move || async move { (200, response.to_string()) }).await
}

/// A mock backend whose status and body come from `f`.
///
/// Aborting the returned handle closes the listening socket.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, JoinHandle<()>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    serve_programmable(listener, f, addr)
}

/// Like [`start_programmable_backend`] but on a fixed address.
pub async fn restart_mock_backend(addr: SocketAddr, response: &'static str) -> JoinHandle<()> {
    let listener = TcpListener::bind(addr).await.unwrap();
    serve_programmable(listener, move || async move { (200, response.to_string()) }, addr).1
}

fn serve_programmable<F, Fut>(listener: TcpListener, f: F, addr: SocketAddr) -> (SocketAddr, JoinHandle<()>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, handle)
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config for `backends` with fast retries and health checks off.
pub fn test_config(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.urls = backends.iter().map(|a| format!("http://{}", a)).collect();
    config.health_check.enabled = false;
    config.retries.backoff_ms = 1;
    config.timeouts.request_secs = 5;
    config
}

/// A running balancer bound to ephemeral ports.
pub struct RunningBalancer {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<()>,
}

impl RunningBalancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin_addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
    }
}

pub async fn start_balancer(config: BalancerConfig, path: Option<std::path::PathBuf>) -> RunningBalancer {
    let balancer = Balancer::from_config(config, path).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let task = tokio::spawn(async move {
        let _ = balancer
            .serve(listener, Some(admin_listener), &server_shutdown)
            .await;
    });

    RunningBalancer {
        addr,
        admin_addr,
        shutdown,
        task,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
