//! callback-relay receives signed payment callbacks and forwards each one
//! to a downstream URL chosen by a list of boolean routing rules.
//!
//! For every request the relay verifies the md5 signature of the `data`
//! field, decodes the base64 JSON payload into typed parameters, picks
//! the first rule whose expression holds (or the default target), posts
//! the original form to that target, and relays status and body back.
//! Any failure becomes a 500 with a short plaintext message.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate).
//! - [`config`] -- Properties file, routing file loading, settings
//!   resolution, and routing file validation.
//! - [`error`] -- Startup and per-request error types using `thiserror`.
//! - [`expr`] -- Routing expression parser (nom) and typed evaluator.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`relay`] -- The per-request pipeline: form extraction, signature
//!   check, payload decoding, rule selection, and forwarding.
//! - [`server`] -- Axum server setup, shared immutable state, HTTP client,
//!   and graceful shutdown.

// Binary crate: public items are internal, not a library API.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod expr;
pub mod logging;
pub mod relay;
pub mod server;
