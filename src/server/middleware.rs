//! HTTP middleware applied by [`ServerBuilder`](super::ServerBuilder)
//!
//! - [`security_headers`]: hardening headers on every response
//! - [`rate_limit`]: per-client request quota on `/api` routes
//! - [`development_error_details`]: adds the cause chain to 5xx bodies

use crate::config::RateLimitConfig;
use crate::core::error::{CatalogError, ErrorSources, RequestError};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::{Value, json};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Requests under this prefix count against the rate limit
pub const API_PREFIX: &str = "/api";

/// Adds security headers to all responses.
///
/// - Content-Security-Policy: default-src 'self'
/// - Cross-Origin-Opener-Policy / Cross-Origin-Resource-Policy: same-origin
/// - Referrer-Policy: no-referrer
/// - Strict-Transport-Security: max-age=15552000; includeSubDomains
/// - X-Content-Type-Options: nosniff
/// - X-DNS-Prefetch-Control: off
/// - X-Frame-Options: SAMEORIGIN
/// - X-Permitted-Cross-Domain-Policies: none
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'self'"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=15552000; includeSubDomains"),
    );
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(
        HeaderName::from_static("x-permitted-cross-domain-policies"),
        HeaderValue::from_static("none"),
    );

    response
}

/// Shared limiter state, keyed by client IP
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    clock: DefaultClock,
}

impl RateLimit {
    /// A client may burst `max_requests`; one request is restored every
    /// `window_secs / max_requests`
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let burst = NonZeroU32::new(config.max_requests)
            .context("rate_limit.max_requests must be at least 1")?;
        let replenish = Duration::from_secs(config.window_secs) / config.max_requests;
        let quota = Quota::with_period(replenish)
            .context("rate_limit.window_secs must be at least 1")?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
        })
    }

    /// Seconds until `client` may send again, or `None` when allowed now
    fn check(&self, client: IpAddr) -> Option<u64> {
        self.limiter.check_key(&client).err().map(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            (wait.as_secs_f64().ceil() as u64).max(1)
        })
    }
}

/// Rejects `/api` requests over the client's quota with 429 and `Retry-After`
pub async fn rate_limit(State(limit): State<RateLimit>, request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with(API_PREFIX) {
        return next.run(request).await;
    }

    let client = client_ip(&request);
    match limit.check(client) {
        None => next.run(request).await,
        Some(retry_after_secs) => {
            tracing::debug!(%client, retry_after_secs, "rate limit exceeded");
            let mut response =
                CatalogError::from(RequestError::TooManyRequests { retry_after_secs })
                    .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            response
        }
    }
}

/// Peer address when the server was started with connect info
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Copies [`ErrorSources`] into the body as `details.sources`
pub async fn development_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let Some(ErrorSources(sources)) = response.extensions().get::<ErrorSources>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let Some(mut error_body) = axum::body::to_bytes(body, usize::MAX)
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
    else {
        return Response::from_parts(parts, Body::empty());
    };

    error_body["details"]["sources"] = json!(sources);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(error_body.to_string()))
}
