//! Forwarding the re-encoded form to the selected target.
//!
//! Issues one `POST` with the form body, waits for the full response and
//! hands back status and body. No retries. A timeout is applied only when
//! the operator configured one.

use std::time::{Duration, Instant};

use axum::body::Body;
use http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use crate::error::PipelineError;
use crate::server::HttpClient;

/// Downstream status and body, relayed verbatim.
#[derive(Debug)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Bytes,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response
    }
}

#[derive(Clone)]
pub struct Forwarder {
    client: HttpClient,
    timeout: Option<Duration>,
}

impl Forwarder {
    #[must_use]
    pub const fn new(client: HttpClient, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }

    /// POST `form_body` to `target` and read the whole response. When a
    /// timeout is configured it bounds the request and the body read
    /// together; running out is a forward error either way.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn forward(&self, target: &str, form_body: String) -> Result<Relayed, PipelineError> {
        let uri: http::Uri = target
            .parse()
            .map_err(|e: http::uri::InvalidUri| forward_error(target, Box::new(e)))?;

        let req = http::Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(form_body)))
            .map_err(|e| forward_error(target, Box::new(e)))?;

        let start = Instant::now();
        let exchange = self.exchange(target, req);
        let relayed = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| forward_error(target, "request timed out".into()))??,
            None => exchange.await?,
        };

        tracing::info!(
            target = %target,
            status = relayed.status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "target responded"
        );

        Ok(relayed)
    }

    async fn exchange(&self, target: &str, req: http::Request<Full<Bytes>>) -> Result<Relayed, PipelineError> {
        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| forward_error(target, Box::new(e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e: hyper::Error| PipelineError::ResponseRead {
                target: target.to_string(),
                source: Box::new(e),
            })?
            .to_bytes();

        Ok(Relayed { status, body })
    }
}

fn forward_error(target: &str, source: Box<dyn std::error::Error + Send + Sync>) -> PipelineError {
    PipelineError::Forward {
        target: target.to_string(),
        source,
    }
}
