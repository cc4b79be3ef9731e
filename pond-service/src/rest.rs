use crate::errors::Error;
use crate::metrics;
use crate::model::{PondRequest, PondResponse, ReadingResponse, Sensor, SensorRequest};
use crate::service::PondService;
use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::error;

#[derive(Clone)]
struct AppState {
    service: PondService,
}

pub fn create_router(service: PondService, cors_origin: HeaderValue) -> Router {
    let state = AppState { service };

    let ponds = Router::new()
        .route("/ponds", get(list_ponds))
        .route("/ponds/add", post(create_pond))
        .route(
            "/ponds/:pond_id",
            get(get_pond).put(update_pond).delete(delete_pond),
        )
        .route(
            "/ponds/:pond_id/sensors",
            get(list_sensors).post(attach_sensor),
        )
        .route(
            "/ponds/:pond_id/sensors/:sensor_type/readings",
            post(append_reading),
        )
        .route(
            "/ponds/:pond_id/sensors/:sensor_type/most-recent",
            get(most_recent_reading),
        )
        .with_state(state);

    Router::new()
        .route("/metrics", get(metrics_handler))
        .nest("/admin", ponds)
        .layer(middleware::from_fn_with_state(cors_origin, cors))
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}

async fn list_ponds(State(state): State<AppState>) -> Result<Json<Vec<PondResponse>>, AppError> {
    Ok(Json(state.service.list_ponds().await?))
}

async fn create_pond(
    State(state): State<AppState>,
    Json(body): Json<PondRequest>,
) -> Result<Json<PondResponse>, AppError> {
    Ok(Json(state.service.create_pond(body).await?))
}

async fn get_pond(
    State(state): State<AppState>,
    Path(pond_id): Path<String>,
) -> Result<Json<Option<PondResponse>>, AppError> {
    Ok(Json(state.service.get_pond(&pond_id).await?))
}

async fn update_pond(
    State(state): State<AppState>,
    Path(pond_id): Path<String>,
    Json(body): Json<PondRequest>,
) -> Result<Json<PondResponse>, AppError> {
    Ok(Json(state.service.update_pond(&pond_id, body).await?))
}

async fn delete_pond(
    State(state): State<AppState>,
    Path(pond_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.service.delete_pond(&pond_id).await?;
    Ok(StatusCode::OK)
}

async fn list_sensors(
    State(state): State<AppState>,
    Path(pond_id): Path<String>,
) -> Result<Json<Vec<Sensor>>, AppError> {
    Ok(Json(state.service.list_sensors(&pond_id).await?))
}

async fn attach_sensor(
    State(state): State<AppState>,
    Path(pond_id): Path<String>,
    Json(body): Json<SensorRequest>,
) -> Result<Json<PondResponse>, AppError> {
    Ok(Json(state.service.attach_sensor(&pond_id, body).await?))
}

/// The request body is taken verbatim as the reading value.
async fn append_reading(
    State(state): State<AppState>,
    Path((pond_id, sensor_type)): Path<(String, String)>,
    value: String,
) -> Result<Json<PondResponse>, AppError> {
    Ok(Json(
        state
            .service
            .append_reading(&pond_id, &sensor_type, value)
            .await?,
    ))
}

async fn most_recent_reading(
    State(state): State<AppState>,
    Path((pond_id, sensor_type)): Path<(String, String)>,
) -> Result<Json<Option<ReadingResponse>>, AppError> {
    Ok(Json(
        state
            .service
            .most_recent_reading(&pond_id, &sensor_type)
            .await?,
    ))
}

/// Lets exactly one browser origin call the API and answers its preflights.
async fn cors(State(origin): State<HeaderValue>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    headers.insert(header::VARY, HeaderValue::from_static("origin"));
    response
}

struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_not_found() {
            return (StatusCode::NOT_FOUND, self.0.to_string()).into_response();
        }

        error!("API error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", self.0),
        )
            .into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}
