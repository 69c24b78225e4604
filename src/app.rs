use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::Query;
use log::{error, info};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::BoxError;
use crate::cache::DatasetCache;
use crate::config::DashboardConfig;
use crate::dashboard;
use crate::dataset::Dataset;
use crate::downloader;
use crate::filter::FilterSet;
use crate::graph::{self, ChartOptions};
use crate::palette::BrandPalette;
use crate::views::ViewId;

pub struct AppState {
    cache: Mutex<DatasetCache>,
    data_path: PathBuf,
    title: String,
    chart_width: u32,
    chart_height: u32,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        AppState {
            cache: Mutex::new(DatasetCache::new()),
            data_path: config.data_path.clone(),
            title: config.title.clone(),
            chart_width: config.chart_width,
            chart_height: config.chart_height,
        }
    }

    /// Current dataset, reloaded if the file changed since the last request
    pub fn dataset(&self) -> Result<Arc<Dataset>, BoxError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| "dataset cache lock poisoned")?;
        cache.get_or_load(&self.data_path)
    }

    /// Canonical path of the file currently cached
    pub fn source_path(&self) -> Option<PathBuf> {
        let cache = self.cache.lock().ok()?;
        cache.source().map(|id| id.path.clone())
    }
}

/// Filter selections as sent by the dashboard form.
///
/// Keys may repeat (`year=2021&year=2022`). Before the form has been
/// submitted (`applied` absent) a dimension with no values means "all";
/// afterwards it means nothing is selected.
#[derive(Deserialize, Default, Debug)]
pub struct FilterQuery {
    #[serde(default)]
    pub year: Vec<i32>,
    #[serde(default)]
    pub segment: Vec<String>,
    #[serde(default)]
    pub engine: Vec<String>,
    #[serde(default)]
    pub applied: Option<String>,
}

impl FilterQuery {
    pub fn to_filter(&self, data: &Dataset) -> FilterSet {
        let all = FilterSet::all(data);
        if self.applied.is_some() {
            return FilterSet {
                years: self.year.iter().copied().collect(),
                segments: self.segment.iter().cloned().collect(),
                engine_types: self.engine.iter().cloned().collect(),
            };
        }
        FilterSet {
            years: if self.year.is_empty() {
                all.years
            } else {
                self.year.iter().copied().collect()
            },
            segments: if self.segment.is_empty() {
                all.segments
            } else {
                self.segment.iter().cloned().collect()
            },
            engine_types: if self.engine.is_empty() {
                all.engine_types
            } else {
                self.engine.iter().cloned().collect()
            },
        }
    }
}

/// Failure of a render pass, reported as HTTP 500
pub struct AppError(BoxError);

impl From<BoxError> for AppError {
    fn from(err: BoxError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", self.0)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/filters", get(get_filters))
        .route("/api/views", get(get_views))
        .route("/chart/:view_id", get(get_chart))
        .route("/export.csv", get(export_csv))
        .route("/export.xlsx", get(export_xlsx))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn run(config: DashboardConfig) -> Result<(), BoxError> {
    let state = Arc::new(AppState::new(&config));

    // Fail at startup if the file is missing or malformed
    let data = state.dataset()?;
    let source = state.source_path().unwrap_or_else(|| config.data_path.clone());
    info!(
        "Serving {} rows ({} brands) from {}",
        data.len(),
        data.brands().len(),
        source.display()
    );

    let app = router(state);

    let listener = TcpListener::bind(config.target.as_str()).await?;
    info!("Listening on http://{}", config.target);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let data = state.dataset()?;
    let filter = params.to_filter(&data);
    let panels = dashboard::build_panels(&data, &filter, state.chart_width, state.chart_height)?;
    let page = dashboard::render_page(&state.title, &data, &filter, &panels, true)?;
    Ok(Html(page))
}

async fn get_filters(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let data = state.dataset()?;
    Ok(Json(data.filter_options()))
}

async fn get_views(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let data = state.dataset()?;
    let filter = params.to_filter(&data);

    let views: Vec<serde_json::Value> = dashboard::view_data(&data, &filter)
        .into_iter()
        .map(|(view, chart)| {
            serde_json::json!({
                "id": view.id(),
                "title": dashboard::panel_title(view, &data),
                "data": chart,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "rows": filter.apply(&data).len(),
        "views": views,
    })))
}

async fn get_chart(
    Path(view_id): Path<String>,
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let view_id = view_id.trim_end_matches(".svg");
    let Some(view) = ViewId::from_id(view_id) else {
        return Ok((StatusCode::NOT_FOUND, format!("Unknown chart '{}'", view_id)).into_response());
    };

    let data = state.dataset()?;
    let filter = params.to_filter(&data);
    let chart = view.compute(&filter.apply(&data));
    let options = ChartOptions::for_view(view, state.chart_width, state.chart_height);
    let svg = graph::render(&chart, &options, &BrandPalette::new(data.brands()))?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn export_csv(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let data = state.dataset()?;
    let filter = params.to_filter(&data);
    let csv = downloader::to_csv(&filter.apply(&data))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"sales.csv\""),
        ],
        csv,
    )
        .into_response())
}

async fn export_xlsx(
    Query(params): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let data = state.dataset()?;
    let filter = params.to_filter(&data);
    let buffer = downloader::to_xlsx(&filter.apply(&data))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"sales.xlsx\""),
        ],
        buffer,
    )
        .into_response())
}
