//! Request handling and transformation.
//!
//! # Responsibilities
//! - Buffer the inbound request so it can be replayed on retry/failover
//! - Rewrite it for a single upstream (path join, query merge)
//! - Strip hop-by-hop headers, append X-Forwarded-For
//!
//! # Design Decisions
//! - Request ID is assigned by middleware before the handler runs
//! - The original Host header is forwarded unchanged
//! - The outbound request is always HTTP/1.1

use std::net::SocketAddr;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use url::Url;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// A fully buffered inbound request that can be forwarded any number of times.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
}

impl ProxyRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    /// Buffer an inbound request, reading at most `limit` body bytes.
    pub async fn from_request(
        request: Request<Body>,
        remote_addr: Option<SocketAddr>,
        limit: usize,
    ) -> Result<Self, axum::Error> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit).await?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            remote_addr,
        })
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }

    /// Build the outbound request for `target`.
    pub fn to_upstream(&self, target: &Url) -> Result<Request<Body>, axum::http::Error> {
        let uri = upstream_uri(target, &self.uri);

        let mut headers = self.headers.clone();
        strip_hop_by_hop(&mut headers);
        if let Some(addr) = self.remote_addr {
            let ip = addr.ip().to_string();
            let forwarded = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
                Some(prior) => format!("{prior}, {ip}"),
                None => ip,
            };
            if let Ok(value) = HeaderValue::from_str(&forwarded) {
                headers.insert(X_FORWARDED_FOR, value);
            }
        }

        let mut builder = Request::builder().method(self.method.clone()).uri(uri);
        if let Some(h) = builder.headers_mut() {
            *h = headers;
        }
        builder.body(Body::from(self.body.clone()))
    }

    #[cfg(test)]
    pub(crate) fn get(path: &'static str) -> Self {
        Self::new(Method::GET, Uri::from_static(path))
    }
}

/// Join the target's base path with the request path and merge query strings.
fn upstream_uri(target: &Url, inbound: &Uri) -> String {
    let mut url = target.clone();
    url.set_path(&join_paths(target.path(), inbound.path()));

    let query = match (target.query(), inbound.query()) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Some(format!("{a}&{b}")),
        (Some(a), _) if !a.is_empty() => Some(a.to_string()),
        (_, Some(b)) if !b.is_empty() => Some(b.to_string()),
        _ => None,
    };
    url.set_query(query.as_deref());
    url.set_fragment(None);
    url.into()
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
