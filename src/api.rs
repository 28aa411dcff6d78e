use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::window::TimeWindow;
use crate::orchestrator::{AppState, Orchestrator, Perspective};

type ApiError = (StatusCode, String);

pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/state", get(get_state))
        .route("/refresh", post(refresh))
        .route("/select", post(select))
        .route("/window", post(set_window))
        .route("/perspective", post(set_perspective))
        .route("/cards/{index}/headline", get(card_headline))
        .layer(CorsLayer::very_permissive())
        .with_state(orchestrator)
}

#[derive(serde::Serialize)]
struct StateView {
    #[serde(flatten)]
    state: AppState,
    headline: Option<String>,
    visible_text: Option<String>,
    rewriter: &'static str,
}

fn view(o: &Orchestrator) -> Json<StateView> {
    let state = o.snapshot();
    Json(StateView {
        headline: state.headline().map(str::to_string),
        visible_text: state.visible_text().map(str::to_string),
        rewriter: o.rewriter_name(),
        state,
    })
}

async fn get_state(State(o): State<Arc<Orchestrator>>) -> Json<StateView> {
    view(&o)
}

async fn refresh(State(o): State<Arc<Orchestrator>>) -> Json<StateView> {
    // Rewrite continues in the background; clients poll /state.
    let _ = o.refresh().await;
    view(&o)
}

#[derive(serde::Deserialize)]
struct SelectReq {
    index: usize,
}

async fn select(
    State(o): State<Arc<Orchestrator>>,
    Json(body): Json<SelectReq>,
) -> Result<Json<StateView>, ApiError> {
    o.select(body.index)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(view(&o))
}

#[derive(serde::Deserialize)]
struct WindowReq {
    window: String,
}

async fn set_window(
    State(o): State<Arc<Orchestrator>>,
    Json(body): Json<WindowReq>,
) -> Result<Json<StateView>, ApiError> {
    let window: TimeWindow = body
        .window
        .parse()
        .map_err(|e: crate::ingest::window::UnknownWindow| {
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;
    let _ = o.set_window(window).await;
    Ok(view(&o))
}

#[derive(serde::Deserialize)]
struct PerspectiveReq {
    perspective: Perspective,
}

async fn set_perspective(
    State(o): State<Arc<Orchestrator>>,
    Json(body): Json<PerspectiveReq>,
) -> Json<StateView> {
    o.set_perspective(body.perspective);
    view(&o)
}

#[derive(serde::Serialize)]
struct HeadlineOut {
    index: usize,
    headline: String,
}

async fn card_headline(
    State(o): State<Arc<Orchestrator>>,
    Path(index): Path<usize>,
) -> Result<Json<HeadlineOut>, ApiError> {
    let headline = o
        .card_headline(index)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(HeadlineOut { index, headline }))
}
