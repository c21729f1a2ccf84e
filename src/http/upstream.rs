//! Upstream HTTP transport.
//!
//! Forwards a buffered `ProxyRequest` to one backend over a pooled
//! hyper-util client. Connect failures, resets and slow upstreams all come
//! back as `ForwardError` so the router decides what happens next.

use std::time::Duration;
use axum::body::Body;
use axum::http::Response;
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use url::Url;
use crate::config::TimeoutConfig;
use crate::http::request::{strip_hop_by_hop, ProxyRequest};
use crate::load_balancer::{ForwardError, Transport};

/// Transport backed by hyper's legacy pooled client.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl HyperTransport {
    pub fn new(config: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(config.request_secs),
        }
    }
}

impl Transport for HyperTransport {
    fn forward<'a>(
        &'a self,
        target: &'a Url,
        request: &'a ProxyRequest,
    ) -> BoxFuture<'a, Result<Response<Body>, ForwardError>> {
        Box::pin(async move {
            let upstream = request.to_upstream(target)?;

            let response = match tokio::time::timeout(self.request_timeout, self.client.request(upstream)).await {
                Ok(result) => result?,
                Err(_) => return Err(ForwardError::Timeout(self.request_timeout)),
            };

            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Ok(Response::from_parts(parts, Body::new(body)))
        })
    }
}
