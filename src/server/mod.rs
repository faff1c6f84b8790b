//! HTTP server for the dashboard and the JSON API.
//!
//! Views and API handlers read the kitchen on every request, so a sync
//! that rebuilds the data bag is visible on the next page load without a
//! restart.

mod handlers;

pub use handlers::{
    api_node, api_node_details, api_nodes, api_roles, graph_view, main_view, virt_view,
};

use crate::config::AppConfig;
use crate::plugins::PluginRegistry;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared, read-only server state.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub plugins: PluginRegistry,
}

impl AppState {
    /// State with the plugins enabled in the configuration.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let plugins =
            PluginRegistry::from_names(&config.plugins.enabled, &config.plugins.monitoring_url);
        Self { config, plugins }
    }
}

/// All dashboard and API routes.
pub fn router(state: Arc<AppState>) -> Router {
    let mut views = Router::new()
        .route("/", get(main_view))
        .route("/graph/", get(graph_view));
    if state.config.dashboard.show_virt_view {
        views = views.route("/virt/", get(virt_view));
    }

    let api = Router::new()
        .route("/api/nodes", get(api_nodes))
        .route("/api/nodes/:name", get(api_node))
        .route("/api/nodes/:name/details", get(api_node_details))
        .route("/api/roles", get(api_roles));

    views
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, start the periodic sync when a repository URL is set, and serve
/// until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();

    if config.repo.url.is_some() {
        let period = Duration::from_secs(config.repo.sync_period_minutes.max(1) * 60);
        tracing::info!(
            "Syncing {} every {} minute(s)",
            config.repo.repo_root().display(),
            period.as_secs() / 60
        );
        tokio::spawn(crate::sync::run_periodic(config.repo.clone(), period));
    } else {
        tracing::debug!("No repository URL configured, periodic sync disabled");
    }

    let state = Arc::new(AppState::new(config));
    if !state.plugins.is_empty() {
        tracing::info!("Enabled plugins: {}", state.plugins.names().join(", "));
    }
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Kitchen dashboard listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
