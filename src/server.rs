use crate::app::App;
use crate::checklist::Checklist;
use crate::config::AppConfig;
use crate::data;
use crate::error::MapError;
use crate::render::RenderPlan;
use crate::snapshot;
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

type SharedApp = Arc<Mutex<App>>;

pub async fn start_server(config: AppConfig) -> Result<()> {
    let port = config.server.port;
    let app = Arc::new(Mutex::new(App::new(config)));

    // Background tick that applies the coalesced filter term once its
    // debounce deadline passes.
    let filter_app = app.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(50));
        loop {
            interval.tick().await;
            filter_app.lock().await.apply_due_filter(Instant::now());
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let router = Router::new()
        .route("/api/regions", get(list_regions))
        .route("/api/region/:id", post(activate_region))
        .route("/api/checklist", get(get_checklist))
        .route("/api/toggle", post(toggle_city))
        .route("/api/select-all", post(select_all))
        .route("/api/filter", post(request_filter))
        .route("/api/render", get(render_plan))
        .route("/api/snapshot", get(download_snapshot))
        .fallback_service(ServeDir::new("web"))
        .layer(CorsLayer::permissive())
        .with_state(app);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

async fn list_regions(State(app): State<SharedApp>) -> Json<Vec<String>> {
    Json(app.lock().await.regions())
}

/// Makes a region active and returns its checklist, fetching the boundary
/// file if this is the first visit. The fetch happens off the lock; when it
/// resolves, `install_dataset` discards the checklist rebuild if the user
/// has moved on to another region in the meantime.
async fn activate_region(
    State(app): State<SharedApp>,
    Path(region): Path<String>,
) -> Result<Json<Checklist>, MapError> {
    let path = {
        let mut guard = app.lock().await;
        guard.set_active(&region)?;
        if guard.dataset_cached(&region) {
            return Ok(Json(guard.checklist().clone()));
        }
        guard.source_for(&region)?
    };

    let loaded = tokio::task::spawn_blocking(move || data::load_dataset(&path))
        .await
        .map_err(|e| MapError::fetch(&region, e))?;
    let dataset = loaded.map_err(|e| MapError::fetch(&region, format!("{e:#}")))?;

    let mut guard = app.lock().await;
    guard.install_dataset(&region, dataset);
    Ok(Json(guard.checklist().clone()))
}

async fn get_checklist(State(app): State<SharedApp>) -> Json<Checklist> {
    Json(app.lock().await.checklist().clone())
}

#[derive(Deserialize)]
struct ToggleRequest {
    region: String,
    name: String,
    included: bool,
}

async fn toggle_city(
    State(app): State<SharedApp>,
    Json(req): Json<ToggleRequest>,
) -> Json<Checklist> {
    let mut guard = app.lock().await;
    guard.toggle(&req.region, &req.name, req.included);
    Json(guard.checklist().clone())
}

#[derive(Deserialize)]
struct SelectAllRequest {
    region: String,
}

async fn select_all(
    State(app): State<SharedApp>,
    Json(req): Json<SelectAllRequest>,
) -> Json<Checklist> {
    let mut guard = app.lock().await;
    guard.select_all(&req.region);
    Json(guard.checklist().clone())
}

#[derive(Deserialize)]
struct FilterRequest {
    term: String,
}

async fn request_filter(State(app): State<SharedApp>, Json(req): Json<FilterRequest>) {
    app.lock().await.request_filter(req.term, Instant::now());
}

async fn render_plan(State(app): State<SharedApp>) -> Json<RenderPlan> {
    Json(app.lock().await.render_plan())
}

async fn download_snapshot(State(app): State<SharedApp>) -> Result<impl IntoResponse, MapError> {
    let (bytes, filename) = {
        let guard = app.lock().await;
        (guard.build_snapshot()?, guard.config.export.filename.clone())
    };
    let headers = [
        (header::CONTENT_TYPE, snapshot::CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes))
}
