//! Request correlation and HTTP metrics middleware.
//!
//! [`MetricsLayer`] assigns every request a [`RequestId`] (the caller's
//! `X-Request-ID` if present, a UUID v7 otherwise), runs the handler inside a
//! `request` span carrying it, echoes it on the response, and records
//! request count, latency and response size per normalised path.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use http_body::Body;
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::{info_span, Span};
use uuid::Uuid;

use crate::metrics::{HTTP_DURATION, HTTP_REQUESTS, HTTP_RESPONSE_SIZE};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, time-sortable UUID v7.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Handlers take the id assigned by [`MetricsLayer`], falling back to the
/// request headers when the layer is not installed.
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match parts.extensions.get::<RequestId>() {
            Some(id) => id.clone(),
            None => extract_or_generate_request_id(&parts.headers),
        })
    }
}

/// The non-empty `X-Request-ID` header value, or a new UUID v7.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RequestId::from)
        .unwrap_or_else(RequestId::generate)
}

/// Metric label for a request path.
///
/// Per-token lookups collapse onto `/api/v1/tokens/{id}` so label cardinality
/// does not grow with the token set.
pub fn normalize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    match path.strip_prefix("/api/v1/tokens/") {
        Some(rest) if !rest.is_empty() => "/api/v1/tokens/{id}".to_string(),
        _ => path.to_string(),
    }
}

fn status_class(status: u16) -> &'static str {
    match status / 100 {
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        5 => "5xx",
        _ => "other",
    }
}

/// Labels shared by every metric recorded for one request.
#[derive(Debug, Clone)]
struct RequestLabels {
    method: String,
    path: String,
}

impl RequestLabels {
    fn record(&self, status: &'static str, elapsed_secs: f64, body_size: Option<u64>) {
        metrics::counter!(
            HTTP_REQUESTS,
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            HTTP_DURATION,
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(elapsed_secs);
        if let Some(size) = body_size {
            metrics::histogram!(HTTP_RESPONSE_SIZE, "path" => self.path.clone())
                .record(size as f64);
        }
    }
}

/// Tower layer installing [`MetricsMiddleware`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Body,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = MetricsFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let started = Instant::now();
        let labels = RequestLabels {
            method: req.method().to_string(),
            path: normalize_path(req.uri().path()),
        };
        let request_id = extract_or_generate_request_id(req.headers());
        req.extensions_mut().insert(request_id.clone());

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %labels.method,
            path = %labels.path,
        );
        let inner = {
            let _enter = span.enter();
            tracing::debug!("handling request");
            self.inner.call(req)
        };

        MetricsFuture {
            inner,
            started,
            labels,
            request_id,
            span,
        }
    }
}

pin_project! {
    /// Response future that tags the response and records metrics when it
    /// resolves.
    pub struct MetricsFuture<F> {
        #[pin]
        inner: F,
        started: Instant,
        labels: RequestLabels,
        request_id: RequestId,
        span: Span,
    }
}

impl<F, ResBody, E> Future for MetricsFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    ResBody: Body,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _enter = this.span.enter();

        let mut result = match this.inner.poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };
        let elapsed = this.started.elapsed().as_secs_f64();

        match &mut result {
            Ok(response) => {
                if let Ok(value) = HeaderValue::from_str(this.request_id.as_str()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                let status = response.status().as_u16();
                let body_size = response.body().size_hint().exact();
                this.labels.record(status_class(status), elapsed, body_size);
                tracing::info!(status, latency_ms = elapsed * 1000.0, "request completed");
            }
            Err(_) => {
                this.labels.record("5xx", elapsed, None);
                tracing::error!(latency_ms = elapsed * 1000.0, "request failed");
            }
        }

        Poll::Ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_header_id_is_used_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-ID", HeaderValue::from_static("refresh-42"));
        assert_eq!(extract_or_generate_request_id(&headers).as_str(), "refresh-42");
    }

    #[test]
    fn test_blank_header_generates_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("  "));
        assert_eq!(extract_or_generate_request_id(&headers).as_str().len(), 36);
        assert_eq!(
            extract_or_generate_request_id(&HeaderMap::new()).as_str().len(),
            36
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/api/v1/route"), "/api/v1/route");
        assert_eq!(normalize_path("/api/v1/tokens?x=1"), "/api/v1/tokens");
        assert_eq!(normalize_path("/api/v1/tokens/"), "/api/v1/tokens/");
        assert_eq!(normalize_path("/api/v1/tokens/bitcoin"), "/api/v1/tokens/{id}");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(200), "2xx");
        assert_eq!(status_class(304), "3xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(502), "5xx");
        assert_eq!(status_class(101), "other");
    }

    #[tokio::test]
    async fn test_extractor_prefers_layer_assigned_id() {
        let mut request = Request::builder()
            .uri("/api/v1/tokens")
            .header("x-request-id", "from-header")
            .body(())
            .unwrap();
        request.extensions_mut().insert(RequestId::new("from-layer"));
        let (mut parts, _) = request.into_parts();

        let id = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.as_str(), "from-layer");
    }

    #[tokio::test]
    async fn test_extractor_falls_back_to_header() {
        let request = Request::builder()
            .header("x-request-id", "from-header")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let id = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.as_str(), "from-header");
    }
}
