//! # Inter-service Plumbing
//!
//! Each pipeline service exposes one method as `POST /rpc/<Method>` with a
//! JSON body, plus `GET /health`.
//!
//! - [`envelope`]: how a handler reports success or an `INTERNAL` failure
//!   together with its safe default payload
//! - [`client`]: typed JSON client with a per-call deadline
//! - [`server`]: router hardening (tracing, bounded concurrency) and the
//!   lifecycle handle of a running service

pub mod client;
pub mod envelope;
pub mod health;
pub mod server;

pub use client::RpcClient;
pub use envelope::{RpcErrorBody, RpcReply};
pub use health::HealthResponse;
pub use server::{RpcServer, ServiceHandle};
