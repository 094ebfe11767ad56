use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::{Alert, AlertStatus};
use crate::scheduler::lifecycle::{self, CreateAlert};
use crate::scheduler::schedule::SchedulePayload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub user_id: Uuid,
    pub medication_id: Uuid,
    #[serde(flatten)]
    pub schedule: SchedulePayload,
}

/// Full alert record plus the derived lifecycle status.
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    #[serde(flatten)]
    pub alert: Alert,
    pub status: AlertStatus,
}

impl From<Alert> for AlertResponse {
    fn from(alert: Alert) -> Self {
        let status = alert.status();
        Self { alert, status }
    }
}

/// POST /api/v1/alerts
pub async fn handle_create_alert(
    State(state): State<AppState>,
    Json(req): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<AlertResponse>), AppError> {
    let alert = lifecycle::create(
        state.store.as_ref(),
        CreateAlert {
            user_id: req.user_id,
            medication_id: req.medication_id,
            schedule: req.schedule,
        },
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(alert.into())))
}

/// GET /api/v1/alerts/:id
pub async fn handle_get_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = state.store.load(id).await?;
    Ok(Json(alert.into()))
}

/// POST /api/v1/alerts/:id/fire
/// Called by the dispatcher when a trigger comes due.
pub async fn handle_fire_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = lifecycle::fire(state.store.as_ref(), id, Utc::now()).await?;
    Ok(Json(alert.into()))
}

/// POST /api/v1/alerts/:id/snooze
pub async fn handle_snooze_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = lifecycle::snooze(state.store.as_ref(), id, Utc::now()).await?;
    Ok(Json(alert.into()))
}

/// POST /api/v1/alerts/:id/deactivate
pub async fn handle_deactivate_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = lifecycle::deactivate(state.store.as_ref(), id).await?;
    Ok(Json(alert.into()))
}

/// POST /api/v1/alerts/:id/reactivate
pub async fn handle_reactivate_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = lifecycle::reactivate(state.store.as_ref(), id, Utc::now()).await?;
    Ok(Json(alert.into()))
}

/// PUT /api/v1/alerts/:id/schedule
pub async fn handle_update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SchedulePayload>,
) -> Result<Json<AlertResponse>, AppError> {
    let alert = lifecycle::update_schedule(state.store.as_ref(), id, payload, Utc::now()).await?;
    Ok(Json(alert.into()))
}
