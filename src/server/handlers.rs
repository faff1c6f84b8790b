//! Route handlers.

use super::AppState;
use crate::dashboard::details::format_node_details;
use crate::dashboard::page::{
    node_list_table, virt_table, Message, PageContext, PageRenderer, RowBuilder, View,
};
use crate::error::{KitchenError, Result};
use crate::graph::generate_node_map;
use crate::model::{Node, NodeIndex};
use crate::repo::{
    environments, filter_nodes, group_nodes_by_host, node_tags, split_list, FilterCriteria,
    KitchenRepo,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const NO_MATCHING_NODES: &str = "There are no nodes that fit the supplied criteria.";
const SELECT_ENVIRONMENT: &str = "Please select an environment";

// ============================================================================
// Views
// ============================================================================

fn page_context(state: &AppState, view: View, query: Vec<(String, String)>) -> PageContext {
    let params: HashMap<String, String> = query.iter().cloned().collect();
    let criteria = FilterCriteria::from_query(&params, &state.config.repo);
    let mut ctx = PageContext::new(view, query, criteria);
    ctx.last_sync = crate::sync::last_sync(&state.config.repo.syncdate_file);
    ctx
}

/// Run blocking repository work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| KitchenError::task(e.to_string()))?
}

/// What a view reads from the kitchen.
struct ViewData {
    nodes: Vec<Node>,
    role_groups: Vec<String>,
}

/// Extended nodes of the kitchen; fills the sidebar data of `ctx`.
async fn load_view_nodes(state: &AppState, ctx: &mut PageContext) -> Result<Vec<Node>> {
    let config = state.config.repo.clone();
    let data = blocking(move || {
        let repo = KitchenRepo::new(&config);
        let nodes = repo.nodes_extended()?;
        let role_groups = repo.role_groups()?;
        Ok(ViewData { nodes, role_groups })
    })
    .await?;
    ctx.role_groups = data.role_groups;
    ctx.environments = environments(&data.nodes);
    ctx.tags = node_tags(&data.nodes);
    Ok(data.nodes)
}

fn repo_error(ctx: &mut PageContext, error: &KitchenError) {
    tracing::error!("{}", error);
    ctx.messages.push(Message::error(error.to_string()));
}

fn html_response(page: Result<String>) -> Response {
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Could not render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// `GET /`: filtered node list.
pub async fn main_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let mut ctx = page_context(&state, View::NodeList, query);
    let rows = RowBuilder::new(
        &state.config.dashboard.tag_classes,
        &state.config.repo.exclude_role_prefix,
    );

    let loaded = load_view_nodes(&state, &mut ctx).await;
    let table = match loaded {
        Ok(nodes) => {
            let mut nodes = filter_nodes(&nodes, &ctx.criteria);
            if nodes.is_empty() {
                ctx.messages.push(Message::info(NO_MATCHING_NODES));
            }
            state.plugins.inject_all(&mut nodes);
            Some(node_list_table(&ctx, nodes, &rows))
        }
        Err(e) => {
            repo_error(&mut ctx, &e);
            None
        }
    };

    let renderer = PageRenderer::new(&state.config.dashboard);
    html_response(renderer.render_table_page(&ctx, table.as_ref()))
}

/// `GET /virt/`: guests grouped under their hosts.
pub async fn virt_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let mut ctx = page_context(&state, View::Virt, query);
    let rows = RowBuilder::new(
        &state.config.dashboard.tag_classes,
        &state.config.repo.exclude_role_prefix,
    );

    let loaded = load_view_nodes(&state, &mut ctx).await;
    let table = match loaded {
        Ok(nodes) => {
            let env_only = FilterCriteria {
                env: ctx.criteria.env.clone(),
                ..FilterCriteria::default()
            };
            let in_env = filter_nodes(&nodes, &env_only);
            let mut hosts = group_nodes_by_host(&in_env, &ctx.criteria.roles);
            if hosts.is_empty() {
                ctx.messages.push(Message::info(NO_MATCHING_NODES));
            }
            state.plugins.inject_all(&mut hosts);
            Some(virt_table(&ctx, &hosts, &rows))
        }
        Err(e) => {
            repo_error(&mut ctx, &e);
            None
        }
    };

    let renderer = PageRenderer::new(&state.config.dashboard);
    html_response(renderer.render_table_page(&ctx, table.as_ref()))
}

/// `GET /graph/`: node map of one environment's guests.
pub async fn graph_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let mut ctx = page_context(&state, View::Graph, query);
    // The node map always shows guests
    ctx.criteria.virt = vec!["guest".to_string()];
    ctx.criteria.tags.clear();

    let loaded = load_view_nodes(&state, &mut ctx).await;
    let mut nodes = match loaded {
        Ok(nodes) => filter_nodes(&nodes, &ctx.criteria),
        Err(e) => {
            repo_error(&mut ctx, &e);
            Vec::new()
        }
    };

    let dot = if ctx.criteria.env.is_empty() {
        nodes.clear();
        ctx.messages.push(Message::info(SELECT_ENVIRONMENT));
        None
    } else {
        Some(generate_node_map(&nodes, &state.config.repo.exclude_role_prefix))
    };

    let renderer = PageRenderer::new(&state.config.dashboard);
    html_response(renderer.render_graph_page(&ctx, dot.as_deref()))
}

// ============================================================================
// API
// ============================================================================

fn api_error(error: &KitchenError) -> Response {
    tracing::error!("{}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

/// Filters given explicitly in the query; absent parameters do not filter.
fn api_criteria(params: &HashMap<String, String>) -> FilterCriteria {
    let list = |key: &str| split_list(params.get(key).map_or("", String::as_str));
    FilterCriteria {
        env: params.get("env").cloned().unwrap_or_default(),
        roles: list("roles"),
        virt: list("virt"),
        tags: list("tags"),
    }
}

/// `GET /api/nodes`: node files, or data bag records with `?extended=1`.
pub async fn api_nodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let config = state.config.repo.clone();
    let extended = params.get("extended").is_some_and(|v| !v.is_empty());
    let nodes = blocking(move || {
        let repo = KitchenRepo::new(&config);
        if extended {
            repo.nodes_extended()
        } else {
            repo.check_kitchen()?;
            repo.load_nodes()
        }
    })
    .await;

    match nodes {
        Ok(nodes) => Json(filter_nodes(&nodes, &api_criteria(&params))).into_response(),
        Err(e) => api_error(&e),
    }
}

/// `GET /api/nodes/:name`: one node file.
pub async fn api_node(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    let config = state.config.repo.clone();
    let lookup = name.clone();
    let node = blocking(move || {
        let repo = KitchenRepo::new(&config);
        repo.check_kitchen()?;
        repo.load_node(&lookup)
    })
    .await;

    match node {
        Ok(Some(node)) => Json(node).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Node '{name}' not found") })),
        )
            .into_response(),
        Err(e) => api_error(&e),
    }
}

/// `GET /api/nodes/:name/details`: highlighted detail fragment.
pub async fn api_node_details(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let config = state.config.repo.clone();
    match blocking(move || KitchenRepo::new(&config).nodes_extended()).await {
        Ok(mut nodes) => {
            state.plugins.inject_all(&mut nodes);
            Html(format_node_details(&NodeIndex::build(nodes), &name)).into_response()
        }
        Err(e) => api_error(&e),
    }
}

/// `GET /api/roles`: role files sorted by name.
pub async fn api_roles(State(state): State<Arc<AppState>>) -> Response {
    let config = state.config.repo.clone();
    let roles = blocking(move || {
        let repo = KitchenRepo::new(&config);
        repo.check_kitchen()?;
        repo.load_roles()
    })
    .await;

    match roles {
        Ok(roles) => Json(roles).into_response(),
        Err(e) => api_error(&e),
    }
}
