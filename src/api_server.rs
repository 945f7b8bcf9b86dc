// Axum API Server Module
//
// Purpose: Dashboard-facing REST API. Proxies the upstream scoring/analytics
// service, ranks recommendation batches locally, and serves fallback data
// whenever an upstream call fails.

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::Engine as _;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::catalog::CropCatalog;
use crate::client::{clamp_forecast_days, ApiError, FarmApiClient, MAX_FORECAST_DAYS};
use crate::config::ServerConfig;
use crate::fallback::{self, DataSource, Fetched};
use crate::irrigation::{irrigation_schedule, weather_alerts, WeatherPoint};
use crate::model::{
    ChatbotRequest, DiseaseDetectionRequest, RecommendationResponse, Season, SoilSample,
    WeatherRequest,
};
use crate::ranking::{rank, RankingQuery};
use crate::soil_health::{assess, SoilHealthReport, SoilHealthRequest};

/// Response header telling the dashboard whether it got live or fallback data
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

/// Decoded images above this size are rejected (10 MB)
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// Request body cap; base64 inflates images by 4/3
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<FarmApiClient>,
    pub catalog: Arc<CropCatalog>,
    /// Live recommendation batches keyed by the wire request
    pub recommendations: Cache<String, RecommendationResponse>,
    /// Crop details and other slow-changing upstream payloads
    pub cache: Cache<String, serde_json::Value>,
    /// Weather payloads (current / forecast / summary)
    pub weather_cache: Cache<String, serde_json::Value>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing upstream client for {}...", config.upstream_url);
        let client = Arc::new(FarmApiClient::new(&config.upstream_url, config.upstream_timeout)?);

        tracing::info!("Loading crop catalog...");
        let catalog = Arc::new(CropCatalog::kerala());
        tracing::info!("Loaded {} crop profiles", catalog.len());

        tracing::info!("Initializing Moka caches...");
        let recommendations = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();
        let weather_cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.weather_cache_ttl)
            .build();

        Ok(Self {
            client,
            catalog,
            recommendations,
            cache,
            weather_cache,
        })
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service info + health check
        .route("/", get(root))
        .route("/health", get(health_check))

        // Crop recommendations (ranked locally)
        .route("/api/crop-recommendations", post(crop_recommendations))
        .route("/api/crops/seasonal/:season", get(seasonal_crops))
        .route("/api/crops/:name", get(get_crop))

        // Soil health (local rules)
        .route("/api/soil-health/assess", post(assess_soil_health))

        // Disease detection
        .route("/api/disease-detection", post(detect_disease))

        // Weather + irrigation
        .route("/api/weather/current", post(current_weather))
        .route("/api/weather/forecast", post(weather_forecast))
        .route("/api/weather/summary", post(weather_summary))
        .route("/api/weather/irrigation", post(irrigation_plan))

        // Chatbot
        .route("/api/chatbot", post(chat))
        .route("/api/chatbot/languages", get(chatbot_languages))

        // Middleware (applied in reverse order)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(CorsLayer::permissive()) // Dashboard is served from another origin
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

/// JSON body plus the data-source header
fn tagged<T: Serialize>(source: DataSource, body: T) -> Response {
    ([(DATA_SOURCE_HEADER, source.as_str())], Json(body)).into_response()
}

fn tagged_fetched<T: Serialize>(fetched: Fetched<T>) -> Response {
    tagged(fetched.source, fetched.value)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "FarmersHub API - Farming Assistant Dashboard Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
        "features": [
            "Crop Recommendations",
            "Plant Disease Detection",
            "Weather Analytics",
            "Irrigation Planning",
            "Soil Health Assessment",
            "AI Chatbot"
        ]
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
struct RankingParams {
    sort: Option<String>,
    profitability: Option<String>,
}

async fn crop_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
    Json(sample): Json<SoilSample>,
) -> Result<Response, AppError> {
    let query = RankingQuery::parse(params.sort.as_deref(), params.profitability.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    sample
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::info!(
        "Crop recommendations for {:?} soil, {} season (sort: {:?}, profitability: {:?})",
        sample.soil_type, sample.season, query.sort, query.profitability
    );

    let cache_key = format!("recommend:{:?}", sample.to_request());
    let fetched = match state.recommendations.get(&cache_key).await {
        Some(cached) => {
            tracing::debug!("Cache hit for recommendation request");
            Fetched::live(cached)
        }
        None => {
            let result = state.client.crop_recommendations(&sample).await;
            if let Ok(resp) = &result {
                state.recommendations.insert(cache_key, resp.clone()).await;
            }
            Fetched::or_fallback(result, "Crop recommendations", fallback::recommendations)
        }
    };

    let ranked = rank(&fetched.value.recommendations, &query);
    let status = ranked.status();
    let records = ranked.into_records();

    tracing::debug!(
        "Ranked batch: {} of {} records ({})",
        records.len(),
        fetched.value.recommendations.len(),
        status
    );

    let body = serde_json::json!({
        "total_recommendations": records.len(),
        "recommendations": records,
        "status": status,
        "source": fetched.source,
        "sort": query.sort,
        "profitability": query.profitability,
        "timestamp": fetched.value.timestamp,
    });

    Ok(tagged(fetched.source, body))
}

async fn get_crop(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    // Upstream names are case-sensitive, so the key is the exact name
    let cache_key = format!("crop:{}", name);

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for crop {}", name);
        return Ok(tagged(DataSource::Live, cached));
    }

    match state.client.crop_details(&name).await {
        Ok(details) => {
            state.cache.insert(cache_key, details.clone()).await;
            Ok(tagged(DataSource::Live, details))
        }
        Err(e) => {
            tracing::warn!("Crop details for {} unavailable upstream: {}", name, e);
            state
                .catalog
                .get(&name)
                .map(|profile| tagged(DataSource::Fallback, profile.to_wire()))
                .ok_or_else(|| AppError::NotFound(format!("Crop {} not found", name)))
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeasonalQuery {
    limit: Option<usize>,
}

async fn seasonal_crops(
    State(state): State<AppState>,
    Path(season): Path<String>,
    Query(params): Query<SeasonalQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let season = Season::parse(&season)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown season '{}'", season)))?;
    let limit = params.limit.unwrap_or(5).min(state.catalog.len());

    let crops = state.catalog.seasonal(season, limit);

    Ok(Json(serde_json::json!({
        "season": season,
        "total": crops.len(),
        "crops": crops,
    })))
}

async fn assess_soil_health(
    Json(request): Json<SoilHealthRequest>,
) -> Result<Json<SoilHealthReport>, AppError> {
    request
        .sample
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(physical) = &request.physical {
        physical
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let report = assess(&request.sample, request.physical.as_ref());
    tracing::info!(
        "Soil health for {:?} soil: {} ({:?})",
        request.sample.soil_type,
        report.overall_score,
        report.health_level
    );

    Ok(Json(report))
}

/// Strip an optional data-URL prefix and check the payload decodes
fn normalize_image(image_base64: &str) -> Result<String, AppError> {
    let payload = match image_base64.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image_base64,
    }
    .trim();

    if payload.is_empty() {
        return Err(AppError::BadRequest("image_base64 is empty".to_string()));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::BadRequest(format!("image_base64 is not valid base64: {}", e)))?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(format!(
            "Image is {} bytes, limit is {}",
            bytes.len(),
            MAX_IMAGE_BYTES
        )));
    }

    Ok(payload.to_string())
}

async fn detect_disease(
    State(state): State<AppState>,
    Json(mut payload): Json<DiseaseDetectionRequest>,
) -> Result<Response, AppError> {
    payload.image_base64 = normalize_image(&payload.image_base64)?;

    tracing::info!("Disease detection request (crop: {:?})", payload.crop_type);

    let result = state.client.detect_disease(&payload).await;
    Ok(tagged_fetched(Fetched::or_fallback(
        result,
        "Disease detection",
        fallback::disease_detection,
    )))
}

/// Cached weather lookup; failures are not cached
async fn cached_weather<F, Fut, T>(
    state: &AppState,
    cache_key: String,
    fetch: F,
) -> Result<serde_json::Value, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ApiError>>,
    T: Serialize,
{
    if let Some(cached) = state.weather_cache.get(&cache_key).await {
        tracing::debug!("Cache hit for {}", cache_key);
        return Ok(cached);
    }

    let value = serde_json::to_value(fetch().await?)
        .map_err(|e| ApiError::Parse(e.to_string()))?;
    state.weather_cache.insert(cache_key, value.clone()).await;
    Ok(value)
}

async fn current_weather(
    State(state): State<AppState>,
    Json(request): Json<WeatherRequest>,
) -> Result<Response, AppError> {
    let key = format!("current:{}", request.cache_key());
    let result = cached_weather(&state, key, || state.client.current_weather(&request)).await;

    Ok(tagged_fetched(Fetched::or_fallback(result, "Current weather", || {
        serde_json::to_value(fallback::current_weather(&request)).unwrap_or_default()
    })))
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    days: Option<u32>,
}

async fn weather_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastQuery>,
    Json(request): Json<WeatherRequest>,
) -> Result<Response, AppError> {
    let days = clamp_forecast_days(params.days.unwrap_or(MAX_FORECAST_DAYS));
    let key = format!("forecast:{}:{}", request.cache_key(), days);
    let result = cached_weather(&state, key, || state.client.weather_forecast(&request, days)).await;

    Ok(tagged_fetched(Fetched::or_fallback(result, "Weather forecast", || {
        serde_json::to_value(fallback::weather_forecast(days)).unwrap_or_default()
    })))
}

async fn weather_summary(
    State(state): State<AppState>,
    Json(request): Json<WeatherRequest>,
) -> Result<Response, AppError> {
    let key = format!("summary:{}", request.cache_key());
    let result = cached_weather(&state, key, || state.client.weather_summary(&request)).await;

    Ok(tagged_fetched(Fetched::or_fallback(
        result,
        "Weather summary",
        fallback::weather_summary,
    )))
}

fn default_soil_moisture() -> f64 {
    50.0
}

#[derive(Debug, Deserialize)]
struct IrrigationRequest {
    points: Vec<WeatherPoint>,
    #[serde(default = "default_soil_moisture")]
    soil_moisture: f64,
}

async fn irrigation_plan(
    Json(request): Json<IrrigationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !(0.0..=100.0).contains(&request.soil_moisture) {
        return Err(AppError::BadRequest(format!(
            "soil_moisture {} must be a percentage (0-100)",
            request.soil_moisture
        )));
    }

    let plan = irrigation_schedule(&request.points, request.soil_moisture);
    let alerts = weather_alerts(&request.points);

    Ok(Json(serde_json::json!({
        "irrigation": plan,
        "alerts": alerts,
        "total_alerts": alerts.len(),
    })))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatbotRequest>,
) -> Result<Response, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message is empty".to_string()));
    }

    let result = state.client.chat(&request).await;
    Ok(tagged_fetched(Fetched::or_fallback(result, "Chatbot", || {
        fallback::chatbot(request.language.as_deref())
    })))
}

async fn chatbot_languages() -> impl IntoResponse {
    Json(serde_json::json!({ "languages": fallback::supported_languages() }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Validation(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
