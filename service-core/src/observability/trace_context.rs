//! W3C Trace Context propagation for outbound HTTP calls.
//!
//! Helpers to inject the `traceparent`/`tracestate` headers so
//! spans started here continue in whatever service receives the request.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::TraceContextExt;
use reqwest::header::HeaderMap;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for W3C tracestate
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Inject the current span's trace context into outgoing headers.
///
/// Does nothing when no OpenTelemetry span is active, e.g. when OTLP export
/// is disabled.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let span = Span::current();
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if span_context.is_valid() {
        // version-trace_id-span_id-trace_flags
        let traceparent = format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        );

        if let Ok(value) = traceparent.parse() {
            headers.insert(TRACEPARENT_HEADER, value);
        }

        let tracestate = span_context.trace_state().header();
        if !tracestate.is_empty()
            && let Ok(value) = tracestate.parse()
        {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }
}

/// Inject trace context and an optional correlation ID.
pub fn inject_trace_headers(headers: &mut HeaderMap, request_id: Option<&str>) {
    inject_trace_context(headers);

    if let Some(id) = request_id
        && let Ok(value) = id.parse()
    {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// A reqwest request that gets trace headers injected when sent.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
}

impl TracedRequest {
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self { request }
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
        }
    }

    pub async fn send_with_request_id(
        self,
        request_id: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some(request_id));

        self.request.headers(headers).send().await
    }
}

pub trait TracedClientExt {
    fn traced_post(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_without_active_span_adds_nothing() {
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn inject_trace_headers_sets_request_id() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("reminder-run-1"));
        assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "reminder-run-1");
        assert!(headers.get(TRACEPARENT_HEADER).is_none());
    }

    #[test]
    fn invalid_request_id_is_skipped() {
        let mut headers = HeaderMap::new();
        inject_trace_headers(&mut headers, Some("bad\nid"));
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn traced_post_sends_request_id_and_body() {
        use axum::{Json, Router, http::HeaderMap as AxumHeaders, routing::post};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route(
            "/hook",
            post(|headers: AxumHeaders, Json(body): Json<serde_json::Value>| async move {
                let id = headers
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({ "id": id, "body": body }))
            }),
        );
        tokio::spawn(async move { axum::serve(listener, router).await });

        let response = reqwest::Client::new()
            .traced_post(&format!("http://{}/hook", addr))
            .json(&serde_json::json!({ "ping": 1 }))
            .send_with_request_id("run-42")
            .await
            .unwrap();

        let echoed: serde_json::Value = response.json().await.unwrap();
        assert_eq!(echoed["id"], "run-42");
        assert_eq!(echoed["body"]["ping"], 1);
    }
}
