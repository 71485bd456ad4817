//! # Service Server
//!
//! Binds a service router, applies the shared middleware stack and runs it in
//! the background until its [`ServiceHandle`] is stopped.
//!
//! Requests are handled in parallel up to `rpc.max_concurrent_requests`;
//! further requests wait for a free slot. A caller that disconnects does not
//! cancel downstream work already in flight.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::RpcConfig;
use crate::error::{PipelineError, PipelineResult};

/// A service router waiting to be bound
#[derive(Debug)]
pub struct RpcServer {
    name: &'static str,
    bind_address: String,
    router: Router,
    max_concurrent_requests: usize,
}

impl RpcServer {
    pub fn new(name: &'static str, bind_address: impl Into<String>, router: Router, rpc: &RpcConfig) -> Self {
        Self {
            name,
            bind_address: bind_address.into(),
            router,
            max_concurrent_requests: rpc.max_concurrent_requests.max(1),
        }
    }

    /// Bind the listener and start serving in the background
    pub async fn spawn(self) -> PipelineResult<ServiceHandle> {
        let listener = TcpListener::bind(&self.bind_address).await.map_err(|e| {
            PipelineError::Server(format!(
                "{} failed to bind '{}': {}",
                self.name, self.bind_address, e
            ))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| PipelineError::Server(format!("{} has no local address: {e}", self.name)))?;

        let app = self.router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(GlobalConcurrencyLimitLayer::new(self.max_concurrent_requests)),
        );

        info!(
            service = self.name,
            address = %local_addr,
            max_concurrent_requests = self.max_concurrent_requests,
            "Service listening"
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let name = self.name;
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            match result {
                Ok(()) => info!(service = name, "Service stopped"),
                Err(e) => error!(service = name, error = %e, "Service terminated with error"),
            }
        });

        Ok(ServiceHandle {
            name,
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }
}

/// Handle for a running service
#[derive(Debug)]
pub struct ServiceHandle {
    name: &'static str,
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ServiceHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL other services use to reach this one
    pub fn base_url(&self) -> String {
        let mut addr = self.local_addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(std::net::Ipv4Addr::LOCALHOST.into());
        }
        format!("http://{addr}")
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn stop(mut self) -> PipelineResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.handle
            .await
            .map_err(|e| PipelineError::Server(format!("{} task failed: {e}", self.name)))
    }
}
