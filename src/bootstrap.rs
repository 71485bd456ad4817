//! # Service Bootstrap
//!
//! Starts pipeline services from a [`PipelineConfig`], either one per process
//! (`lexstat storage`) or all four in-process (`lexstat all`).
//!
//! When started together, each service is wired to the address its upstream
//! actually bound, so ephemeral ports (`127.0.0.1:0`) work for tests.

use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::CacheProvider;
use crate::config::{ConfigManager, PipelineConfig};
use crate::constants::services;
use crate::error::PipelineResult;
use crate::rpc::{RpcServer, ServiceHandle};
use crate::services::{
    analyzer, presenter, storage, text_source, AnalyzerService, HttpAnalyzerClient,
    HttpStorageClient, HttpTextSourceClient, PresenterService, StorageService, TextSourceService,
};

/// Which services a process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    TextSource,
    Analyzer,
    Storage,
    Presenter,
    All,
}

/// Lifecycle handle for every service started by this process
#[derive(Debug)]
pub struct PipelineHandle {
    services: Vec<ServiceHandle>,
    environment: String,
}

impl PipelineHandle {
    fn new(environment: &str) -> Self {
        Self {
            services: Vec::new(),
            environment: environment.to_string(),
        }
    }

    fn push(&mut self, handle: ServiceHandle) {
        self.services.push(handle);
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn services(&self) -> &[ServiceHandle] {
        &self.services
    }

    /// First handle registered under `name`
    pub fn service(&self, name: &str) -> Option<&ServiceHandle> {
        self.services.iter().find(|h| h.name() == name)
    }

    /// Base URL of the presenter's public page, when running
    pub fn page_url(&self) -> Option<String> {
        self.services
            .iter()
            .find(|h| h.name() == PRESENTER_PAGE)
            .map(ServiceHandle::base_url)
    }

    /// Stop services in reverse start order
    pub async fn stop_all(mut self) -> PipelineResult<()> {
        info!(count = self.services.len(), "Stopping pipeline services");
        let mut first_error = None;
        while let Some(handle) = self.services.pop() {
            let name = handle.name();
            if let Err(e) = handle.stop().await {
                warn!(service = name, error = %e, "Service did not stop cleanly");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Handle name of the public HTML listener
pub const PRESENTER_PAGE: &str = "presenter_page";

pub async fn start_text_source(config: &PipelineConfig) -> PipelineResult<ServiceHandle> {
    let service = Arc::new(TextSourceService::new(config.text_source.corpus_path.clone()));
    info!(corpus = %config.text_source.corpus_path.display(), "Starting text source");
    RpcServer::new(
        services::TEXT_SOURCE,
        &config.text_source.bind_address,
        text_source::router(service),
        &config.rpc,
    )
    .spawn()
    .await
}

pub async fn start_analyzer(config: &PipelineConfig) -> PipelineResult<ServiceHandle> {
    let text_source = HttpTextSourceClient::new(&config.analyzer.text_source_url, &config.rpc)?;
    let service = Arc::new(AnalyzerService::new(Arc::new(text_source)));
    info!(text_source = %config.analyzer.text_source_url, "Starting analyzer");
    RpcServer::new(
        services::ANALYZER,
        &config.analyzer.bind_address,
        analyzer::router(service),
        &config.rpc,
    )
    .spawn()
    .await
}

pub async fn start_storage(config: &PipelineConfig) -> PipelineResult<ServiceHandle> {
    let analyzer = HttpAnalyzerClient::new(&config.storage.analyzer_url, &config.rpc)?;
    let cache = CacheProvider::from_config_graceful(&config.cache).await;
    if !cache.is_enabled() {
        warn!("Storage running without a cache, every request recomputes");
    }
    let service = Arc::new(StorageService::from_config(
        cache,
        Arc::new(analyzer),
        &config.storage,
    ));
    info!(
        analyzer = %config.storage.analyzer_url,
        cache_key = %config.storage.cache_key,
        tracked_terms = config.storage.tracked_terms.len(),
        "Starting storage"
    );
    RpcServer::new(
        services::STORAGE,
        &config.storage.bind_address,
        storage::router(service),
        &config.rpc,
    )
    .spawn()
    .await
}

/// Start the presenter RPC endpoint and its public page
pub async fn start_presenter(
    config: &PipelineConfig,
) -> PipelineResult<(ServiceHandle, ServiceHandle)> {
    let storage = HttpStorageClient::new(&config.presenter.storage_url, &config.rpc)?;
    let service = Arc::new(PresenterService::new(Arc::new(storage)));
    info!(storage = %config.presenter.storage_url, "Starting presenter");

    let rpc = RpcServer::new(
        services::PRESENTER,
        &config.presenter.bind_address,
        presenter::rpc_router(service.clone()),
        &config.rpc,
    )
    .spawn()
    .await?;

    let page = match RpcServer::new(
        PRESENTER_PAGE,
        &config.presenter.http_bind_address,
        presenter::page_router(service),
        &config.rpc,
    )
    .spawn()
    .await
    {
        Ok(page) => page,
        Err(e) => {
            let _ = rpc.stop().await;
            return Err(e);
        }
    };

    Ok((rpc, page))
}

/// Start all four services, wiring each to its upstream's bound address
pub async fn start_all(config: &PipelineConfig) -> PipelineResult<PipelineHandle> {
    let environment = crate::logging::get_environment();
    let mut handle = PipelineHandle::new(&environment);
    if let Err(e) = start_chain(config.clone(), &mut handle).await {
        let _ = handle.stop_all().await;
        return Err(e);
    }
    info!(services = handle.services.len(), "Pipeline started");
    Ok(handle)
}

async fn start_chain(mut config: PipelineConfig, handle: &mut PipelineHandle) -> PipelineResult<()> {
    let text_source = start_text_source(&config).await?;
    config.analyzer.text_source_url = text_source.base_url();
    handle.push(text_source);

    let analyzer = start_analyzer(&config).await?;
    config.storage.analyzer_url = analyzer.base_url();
    handle.push(analyzer);

    let storage = start_storage(&config).await?;
    config.presenter.storage_url = storage.base_url();
    handle.push(storage);

    let (rpc, page) = start_presenter(&config).await?;
    handle.push(rpc);
    handle.push(page);
    Ok(())
}

/// Start the services for `role` using the managed configuration
pub async fn start_role(
    role: ServiceRole,
    manager: &ConfigManager,
) -> PipelineResult<PipelineHandle> {
    let config = manager.config();
    let mut handle = PipelineHandle::new(manager.environment());
    match role {
        ServiceRole::All => {
            let mut all = start_all(config).await?;
            all.environment = manager.environment().to_string();
            return Ok(all);
        }
        ServiceRole::TextSource => handle.push(start_text_source(config).await?),
        ServiceRole::Analyzer => handle.push(start_analyzer(config).await?),
        ServiceRole::Storage => handle.push(start_storage(config).await?),
        ServiceRole::Presenter => {
            let (rpc, page) = start_presenter(config).await?;
            handle.push(rpc);
            handle.push(page);
        }
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PresenterConfig, TextSourceConfig};

    fn local_config(corpus: &std::path::Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.text_source = TextSourceConfig {
            bind_address: "127.0.0.1:0".to_string(),
            corpus_path: corpus.to_path_buf(),
        };
        config.analyzer.bind_address = "127.0.0.1:0".to_string();
        config.storage.bind_address = "127.0.0.1:0".to_string();
        config.presenter = PresenterConfig {
            bind_address: "127.0.0.1:0".to_string(),
            http_bind_address: "127.0.0.1:0".to_string(),
            ..PresenterConfig::default()
        };
        config
    }

    #[tokio::test]
    async fn test_start_all_registers_every_service() {
        let corpus = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(corpus.path(), "Thou art.").unwrap();

        let handle = start_all(&local_config(corpus.path())).await.unwrap();
        let names: Vec<_> = handle.services().iter().map(ServiceHandle::name).collect();
        assert_eq!(
            names,
            vec!["text_source", "analyzer", "storage", "presenter", "presenter_page"]
        );
        assert!(handle.page_url().is_some());
        assert!(handle.service(services::STORAGE).is_some());

        handle.stop_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_stops_already_started_services() {
        let corpus = tempfile::NamedTempFile::new().unwrap();
        let mut config = local_config(corpus.path());
        config.storage.bind_address = "not-an-address".to_string();

        let err = start_all(&config).await.unwrap_err();
        assert_eq!(err.category(), "server");
    }
}
