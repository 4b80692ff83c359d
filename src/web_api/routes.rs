//! API Routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::camera_params::{self, CameraParamSpec, CAMERA_PARAMS};
use crate::device_client::{DeviceCommand, LedAction, MotionCommand, SpeedDirection, SPEED_STEP_DEFAULT};
use crate::error::{Error, Result};
use crate::keyboard::{KeyEvent, KeyResponse};
use crate::models::{
    ApiResponse, CameraParamInfo, CameraParamRequest, CommandAccepted, KeyPhase, KeyRequest,
    LedSwitchRequest, PanelSnapshot, SpeedQuery,
};
use crate::preset::{CameraPreset, PresetReport};
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(super::health_check))
        // Panel view
        .route("/api/panel", get(get_panel))
        .route("/api/panel/frame", get(get_frame))
        .route("/api/panel/log", delete(clear_log))
        // Driving
        .route("/api/panel/keys", post(handle_key))
        .route("/api/panel/control/:cmd", post(control))
        .route("/api/panel/speed/:op", post(speed))
        .route("/api/panel/led/:state", post(led))
        .route("/api/panel/led-switch", post(led_switch))
        // Camera
        .route("/api/panel/camera/:param", post(set_camera_param))
        .route("/api/panel/sliders/:param/grab", post(grab_slider))
        .route("/api/panel/sliders/:param/release", post(release_slider))
        .route("/api/panel/presets/:id", post(apply_preset))
        // Catalogs
        .route("/api/presets", get(list_presets))
        .route("/api/camera-params", get(list_camera_params))
        .with_state(state)
}

// ========================================
// Panel view
// ========================================

async fn get_panel(State(state): State<AppState>) -> Json<PanelSnapshot> {
    Json(PanelSnapshot {
        view: state.view.snapshot(),
        log: state
            .panel
            .log
            .entries()
            .await
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}

async fn get_frame(State(state): State<AppState>) -> impl IntoResponse {
    match state.view.latest_frame() {
        Some(frame) => (
            StatusCode::OK,
            [
                ("content-type", "image/jpeg"),
                ("cache-control", "no-cache, no-store, must-revalidate"),
            ],
            frame.as_ref().clone(),
        )
            .into_response(),
        None => Error::NotFound("No frame captured yet".to_string()).into_response(),
    }
}

async fn clear_log(State(state): State<AppState>) -> StatusCode {
    state.panel.log.clear().await;
    StatusCode::NO_CONTENT
}

// ========================================
// Driving
// ========================================

fn accepted(command: DeviceCommand) -> (StatusCode, Json<ApiResponse<CommandAccepted>>) {
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(CommandAccepted {
            command: command.to_string(),
        })),
    )
}

async fn handle_key(
    State(state): State<AppState>,
    Json(req): Json<KeyRequest>,
) -> Json<KeyResponse> {
    let event = KeyEvent {
        key: req.key,
        text_input: req.text_input,
    };
    let response = match req.phase {
        KeyPhase::Down => state.panel.keyboard.on_key_down(&event),
        KeyPhase::Up => state.panel.keyboard.on_key_up(&event),
    };
    Json(response)
}

async fn control(
    State(state): State<AppState>,
    Path(cmd): Path<String>,
) -> Result<impl IntoResponse> {
    let command = DeviceCommand::Motion(cmd.parse::<MotionCommand>()?);
    state.panel.dispatcher.dispatch(command);
    Ok(accepted(command))
}

async fn speed(
    State(state): State<AppState>,
    Path(op): Path<String>,
    Query(query): Query<SpeedQuery>,
) -> Result<impl IntoResponse> {
    let direction = op.parse::<SpeedDirection>()?;
    let command = DeviceCommand::speed(direction, query.step.unwrap_or(SPEED_STEP_DEFAULT));
    state.panel.dispatcher.dispatch(command);
    Ok(accepted(command))
}

async fn led(
    State(state): State<AppState>,
    Path(led_state): Path<String>,
) -> Result<impl IntoResponse> {
    let command = DeviceCommand::Led(led_state.parse::<LedAction>()?);
    state.panel.dispatcher.dispatch(command);
    Ok(accepted(command))
}

async fn led_switch(
    State(state): State<AppState>,
    Json(req): Json<LedSwitchRequest>,
) -> impl IntoResponse {
    state.panel.dispatcher.set_led_switch(req.on);
    let action = if req.on { LedAction::On } else { LedAction::Off };
    accepted(DeviceCommand::Led(action))
}

// ========================================
// Camera
// ========================================

fn known_param(param: &str) -> Result<&'static CameraParamSpec> {
    camera_params::lookup(param)
        .ok_or_else(|| Error::NotFound(format!("Unknown camera parameter: {}", param)))
}

async fn set_camera_param(
    State(state): State<AppState>,
    Path(param): Path<String>,
    Json(req): Json<CameraParamRequest>,
) -> Result<impl IntoResponse> {
    known_param(&param)?;
    state
        .panel
        .params
        .on_parameter_changed(&param, &req.raw_value())
        .await;
    Ok(StatusCode::ACCEPTED)
}

async fn grab_slider(
    State(state): State<AppState>,
    Path(param): Path<String>,
) -> Result<StatusCode> {
    known_param(&param)?;
    state.view.grab_slider(&param);
    Ok(StatusCode::NO_CONTENT)
}

async fn release_slider(
    State(state): State<AppState>,
    Path(param): Path<String>,
) -> Result<StatusCode> {
    known_param(&param)?;
    state.view.release_slider(&param);
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_preset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PresetReport>>> {
    let preset = CameraPreset::find(&id)
        .ok_or_else(|| Error::NotFound(format!("Unknown preset: {}", id)))?;
    let report = state.panel.presets.apply(&preset).await;
    Ok(Json(ApiResponse::success(report)))
}

// ========================================
// Catalogs
// ========================================

async fn list_presets() -> Json<Vec<CameraPreset>> {
    Json(CameraPreset::builtin())
}

async fn list_camera_params() -> Json<Vec<CameraParamInfo>> {
    Json(CAMERA_PARAMS.iter().map(CameraParamInfo::from).collect())
}
