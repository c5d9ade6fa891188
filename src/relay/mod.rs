//! Per-request callback pipeline.
//!
//! [`relay_handler`] is the Axum fallback that receives every request. It
//! extracts the form, then runs [`process`]: signature check
//! ([`signature`]), payload decoding ([`payload`]), rule selection
//! ([`routing`]) and forwarding ([`forward`]). Any failure short-circuits
//! and is turned into a 500 with a short plaintext body. The pipeline runs
//! in its own task so a panic is contained to the request that caused it.

pub mod form;
pub mod forward;
pub mod payload;
pub mod routing;
pub mod signature;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use tokio::task::JoinError;

use crate::error::PipelineError;
use crate::server::AppState;

use form::Form;
use forward::Relayed;

/// Run one callback through verification, decoding, routing and forwarding.
pub async fn process(state: &AppState, form: &Form, correlation_id: &str) -> Result<Relayed, PipelineError> {
    let payload = signature::normalize_payload(form.value("data"))?;
    signature::verify(&payload, form.value("sign"), &state.signing_key)?;

    let params = payload::decode(&payload)?;
    let target = routing::select_target(&state.rules, &params);

    tracing::info!(
        correlation_id = %correlation_id,
        target = %target,
        payload_len = payload.len(),
        "forwarding callback"
    );

    state.forwarder.forward(target, form.encode()).await
}

pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let form = Form::from_request(&method, uri.query(), &headers, &body);
    let payload_len = form.value("data").len();

    tracing::info!(
        correlation_id = %correlation_id,
        client = %addr,
        method = %method,
        path = %uri.path(),
        payload_len,
        "callback received"
    );

    let task_cid = correlation_id.clone();
    let handle = tokio::spawn(async move { process(&state, &form, &task_cid).await });

    match join_outcome(handle.await) {
        Ok(relayed) => relayed.into_response(),
        Err(e) => {
            let target = match &e {
                PipelineError::Forward { target, .. } | PipelineError::ResponseRead { target, .. } => {
                    Some(target.as_str())
                }
                _ => None,
            };
            tracing::error!(
                correlation_id = %correlation_id,
                kind = e.kind(),
                target = target.unwrap_or("-"),
                payload_len,
                error = %e,
                "callback failed"
            );
            e.into_response()
        }
    }
}

/// Flatten the pipeline task's result. A panicked or cancelled task is an
/// unexpected fault.
fn join_outcome(joined: Result<Result<Relayed, PipelineError>, JoinError>) -> Result<Relayed, PipelineError> {
    joined.unwrap_or_else(|join_err| Err(PipelineError::Unexpected(join_err.to_string())))
}
