#![forbid(unsafe_code)]

//! HTTP front door: sign-in cookie, search proxy, metadata lookups and the
//! three server-rendered pages.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    extract::{Path as AxumPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use clap::Parser;
use lockedtube::{
    catalog::{Catalog, CatalogError, SearchItem, VideoMeta, YouTubeCatalog},
    config::{DEFAULT_CONFIG_PATH, load_runtime_config},
    display::{format_published, format_views},
    identity::{UserId, clear_cookie},
    logging::{DEFAULT_LOG_FILTER, init_tracing},
    pages::{self, SearchOutcome},
};
use serde::{Deserialize, Serialize};
use tokio::{signal, task};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve the LockedTube site.")]
struct Cli {
    #[arg(
        long = "config",
        value_name = "PATH",
        help = "Path to the env-style config file (default /etc/lockedtube-env)"
    )]
    config: Option<PathBuf>,
    #[arg(long = "host", value_name = "ADDR", help = "Override the listen address")]
    host: Option<String>,
    #[arg(long = "port", value_name = "PORT", help = "Override the listen port")]
    port: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<dyn Catalog>,
    secure_cookies: bool,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MissingCredential => Self::internal(err.to_string()),
            CatalogError::Upstream { status } => Self {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message: err.to_string(),
            },
            CatalogError::Transport(_) | CatalogError::Decode(_) => {
                Self::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(DEFAULT_LOG_FILTER)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config =
        load_runtime_config(Some(config_path.clone())).with_context(|| {
            format!("loading configuration from {}", config_path.display())
        })?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if config.yt_api_key.is_none() {
        warn!("YT_API_KEY is not configured; searches will report an error");
    }

    let catalog = YouTubeCatalog::new(config.yt_api_key.clone(), config.search_max_results);
    let state = AppState {
        catalog: Arc::new(catalog),
        secure_cookies: config.secure_cookies,
    };
    let app = router(state);

    let addr = SocketAddr::new(
        config
            .host
            .parse()
            .with_context(|| format!("parsing listen address {}", config.host))?,
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!(%addr, "LockedTube listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(sign_in))
        .route("/home", get(home))
        .route("/player/{id}", get(player))
        .route("/signout", post(sign_out_form))
        .route("/api/whoami", get(whoami))
        .route("/api/signout", get(sign_out).post(sign_out))
        .route("/api/youtube/search", get(search))
        .route("/api/videos/{id}", get(video_details))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(error = %err, "failed to install Ctrl+C handler");
    }
}

#[derive(Debug, Deserialize)]
struct SignInForm {
    #[serde(default)]
    uid: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    #[serde(flatten)]
    meta: VideoMeta,
    views_label: Option<String>,
    published_label: Option<String>,
}

async fn index(headers: HeaderMap) -> Response {
    if UserId::from_headers(&headers).is_some() {
        return Redirect::to("/home").into_response();
    }
    Html(pages::sign_in_page()).into_response()
}

async fn sign_in(State(state): State<AppState>, Form(form): Form<SignInForm>) -> Response {
    match UserId::parse(&form.uid) {
        Some(uid) => {
            info!(uid = %uid, "visitor signed in");
            (
                [(header::SET_COOKIE, uid.set_cookie(state.secure_cookies))],
                Redirect::to("/home"),
            )
                .into_response()
        }
        // Invalid input looks exactly like no input.
        None => Redirect::to("/").into_response(),
    }
}

async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    let Some(uid) = UserId::from_headers(&headers) else {
        return Redirect::to("/").into_response();
    };
    let query = params.search.unwrap_or_default();
    let query = query.trim();
    let outcome = if query.is_empty() {
        SearchOutcome::NotSearched
    } else {
        match state.search(query).await {
            Ok(items) => SearchOutcome::Results(items),
            Err(err) => SearchOutcome::Failed(err.message),
        }
    };
    Html(pages::home_page(&uid, query, &outcome)).into_response()
}

async fn player(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let Some(uid) = UserId::from_headers(&headers) else {
        return Redirect::to("/").into_response();
    };
    let meta = state.video_meta(&id).await;
    let origin = request_origin(&headers, state.secure_cookies);
    let search = params.search.unwrap_or_default();
    Html(pages::player_page(&uid, &id, &search, meta.as_ref(), &origin)).into_response()
}

async fn whoami(headers: HeaderMap) -> Json<serde_json::Value> {
    let uid = UserId::from_headers(&headers).map(|uid| uid.to_string());
    Json(serde_json::json!({ "uid": uid }))
}

async fn sign_out(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, clear_cookie(state.secure_cookies))],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response()
}

/// Browser form variant of sign-out: clears the cookie and returns to `/`.
async fn sign_out_form(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, clear_cookie(state.secure_cookies))],
        Redirect::to("/"),
    )
        .into_response()
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params.q.unwrap_or_default();
    let items = state.search(query.trim()).await?;
    Ok(Json(SearchResponse { items }))
}

async fn video_details(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<VideoDetails>> {
    let meta = state
        .video_meta(&id)
        .await
        .ok_or_else(|| ApiError::not_found("video not found"))?;
    Ok(Json(VideoDetails {
        views_label: format_views(meta.view_count.as_deref()),
        published_label: format_published(meta.published_at.as_deref()),
        meta,
    }))
}

impl AppState {
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchItem>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let catalog = self.catalog.clone();
        let items = task::spawn_blocking({
            let query = query.to_owned();
            move || catalog.search(&query)
        })
        .await
        .map_err(|err| ApiError::internal(format!("task join error: {err}")))?
        .map_err(|err| {
            warn!(error = %err, "search failed");
            ApiError::from(err)
        })?;
        Ok(items)
    }

    async fn video_meta(&self, id: &str) -> Option<VideoMeta> {
        let catalog = self.catalog.clone();
        task::spawn_blocking({
            let id = id.to_owned();
            move || catalog.video_meta(&id)
        })
        .await
        .map_err(|err| warn!(error = %err, "metadata task failed"))
        .ok()
        .flatten()
    }
}

/// Origin the embedded widget should post messages back to.
fn request_origin(headers: &HeaderMap, secure: bool) -> String {
    let scheme = if secure { "https" } else { "http" };
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| format!("{scheme}://{host}"))
        .unwrap_or_default()
}
