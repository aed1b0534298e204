use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing::info;

use crate::{
    catalog::{DynCatalogClient, HttpCatalogClient},
    config::AppConfig,
    player::ProxyRoute,
};

use super::streaming_proxy_services::{
    DynStreamingProxyService, StreamingProxyService, UpstreamIdentity,
};

/// everything a handler needs, shared through an `Extension`
#[derive(Clone)]
pub struct AppServices {
    pub streaming_proxy: DynStreamingProxyService,
    pub catalog: DynCatalogClient,
    pub proxy_route: ProxyRoute,
    pub config: Arc<AppConfig>,
}

impl AppServices {
    pub fn new(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        info!("starting services...");

        let connect_timeout = Duration::from_secs(config.upstream_connect_timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("failed to build the upstream http client")?;

        let streaming_proxy = Arc::new(StreamingProxyService::new(
            http,
            UpstreamIdentity::from(config.as_ref()),
        )) as DynStreamingProxyService;

        let catalog = Arc::new(
            HttpCatalogClient::with_connect_timeout(&config.content_api_url, connect_timeout)
                .context("content api client")?,
        ) as DynCatalogClient;

        info!("services ok, content api at {}", config.content_api_url);

        Ok(Self::from_parts(config, streaming_proxy, catalog))
    }

    /// wire up with custom (usually mocked) collaborators
    pub fn from_parts(
        config: Arc<AppConfig>,
        streaming_proxy: DynStreamingProxyService,
        catalog: DynCatalogClient,
    ) -> Self {
        Self {
            streaming_proxy,
            catalog,
            proxy_route: ProxyRoute::default(),
            config,
        }
    }
}
