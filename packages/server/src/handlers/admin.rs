use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use jury_core::matrix::MatrixSnapshot;
use jury_core::{ClockState, Options};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{ADMIN_USER, AdminAuth, check_admin};
use crate::extractors::json::AppJson;
use crate::models::admin::*;
use crate::models::shared::OkResponse;
use crate::service::event::{self, ClockAction, Orderings, ScoredProject};
use crate::state::AppState;
use crate::store::{Stats, Store};

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "Admin",
    operation_id = "adminLogin",
    summary = "Check the admin password",
    description = "Admin requests authenticate with HTTP Basic credentials (`admin` and this password); this endpoint only lets a client verify the password up front.",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Password accepted", body = OkResponse),
        (status = 401, description = "Wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AdminLoginRequest>,
) -> Result<Json<OkResponse>, AppError> {
    check_admin(&state, ADMIN_USER, &payload.password)?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/admin/auth",
    tag = "Admin",
    operation_id = "adminAuth",
    summary = "Check admin credentials",
    responses(
        (status = 200, description = "Credentials valid", body = OkResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn auth(_admin: AdminAuth) -> Json<OkResponse> {
    Json(OkResponse::new())
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    operation_id = "eventStats",
    summary = "Event-wide counters",
    responses(
        (status = 200, description = "Counters", body = Stats),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Stats>, AppError> {
    Ok(Json(Store::new(&state.db).aggregate_stats().await?))
}

#[utoipa::path(
    get,
    path = "/admin/clock",
    tag = "Clock",
    operation_id = "getClock",
    summary = "Current judging clock",
    responses(
        (status = 200, description = "Clock", body = ClockResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn get_clock(_admin: AdminAuth, State(state): State<AppState>) -> Json<ClockResponse> {
    let (clock, time) = state.clock.snapshot();
    Json(ClockResponse {
        ok: 1,
        running: clock.running,
        time,
    })
}

async fn apply_clock(state: &AppState, action: ClockAction) -> Result<Json<ClockResponse>, AppError> {
    let ClockState { running, .. } = event::update_clock(state, action).await?;
    Ok(Json(ClockResponse {
        ok: 1,
        running,
        time: state.clock.duration(),
    }))
}

#[utoipa::path(
    post,
    path = "/admin/clock/pause",
    tag = "Clock",
    operation_id = "pauseClock",
    summary = "Pause the judging clock",
    responses(
        (status = 200, description = "Clock paused", body = ClockResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn pause_clock(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ClockResponse>, AppError> {
    apply_clock(&state, ClockAction::Pause).await
}

#[utoipa::path(
    post,
    path = "/admin/clock/unpause",
    tag = "Clock",
    operation_id = "resumeClock",
    summary = "Resume the judging clock",
    responses(
        (status = 200, description = "Clock running", body = ClockResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn resume_clock(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ClockResponse>, AppError> {
    apply_clock(&state, ClockAction::Resume).await
}

#[utoipa::path(
    post,
    path = "/admin/clock/reset",
    tag = "Clock",
    operation_id = "resetClock",
    summary = "Stop the clock and zero it",
    responses(
        (status = 200, description = "Clock reset", body = ClockResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn reset_clock(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ClockResponse>, AppError> {
    apply_clock(&state, ClockAction::Reset).await
}

#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "Admin",
    operation_id = "resetEvent",
    summary = "Wipe all event data",
    description = "Deletes every project, judge, flag and log entry, restores default options and clears the comparison matrix and the clock.",
    responses(
        (status = 200, description = "Event reset", body = OkResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn reset(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<OkResponse>, AppError> {
    event::reset(&state).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    get,
    path = "/admin/flags",
    tag = "Admin",
    operation_id = "listFlags",
    summary = "List recorded skips",
    description = "Absent, busy and cannot-demo skips with the judge and project names. Names are empty for deleted records.",
    responses(
        (status = 200, description = "Flags, oldest first", body = Vec<FlagResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn list_flags(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<FlagResponse>>, AppError> {
    let store = Store::new(&state.db);
    let flags = store.find_flags().await?;
    let judges: HashMap<_, _> = store
        .find_judges()
        .await?
        .into_iter()
        .map(|j| (j.id, j.name))
        .collect();
    let projects: HashMap<_, _> = store
        .find_projects()
        .await?
        .into_iter()
        .map(|p| (p.id, (p.name, p.location)))
        .collect();

    let out = flags
        .into_iter()
        .map(|f| {
            let judge_name = judges.get(&f.judge_id).cloned().unwrap_or_default();
            let (project_name, location) = projects.get(&f.project_id).cloned().unwrap_or_default();
            FlagResponse::new(f, judge_name, project_name, location)
        })
        .collect();
    Ok(Json(out))
}

#[utoipa::path(
    get,
    path = "/admin/score",
    tag = "Results",
    operation_id = "projectScores",
    summary = "Aggregated project scores",
    description = "Sum of per-judge Copeland scores, star counts and per-track star counts, best first.",
    responses(
        (status = 200, description = "Scores", body = Vec<ScoredProject>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn scores(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoredProject>>, AppError> {
    Ok(Json(event::scores(&state).await?))
}

#[utoipa::path(
    get,
    path = "/admin/rankings",
    tag = "Results",
    operation_id = "projectOrderings",
    summary = "Borda and Copeland orderings",
    responses(
        (status = 200, description = "Orderings", body = Orderings),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn orderings(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Orderings>, AppError> {
    Ok(Json(event::orderings(&state).await?))
}

#[utoipa::path(
    get,
    path = "/admin/options",
    tag = "Admin",
    operation_id = "getOptions",
    summary = "Event options",
    responses(
        (status = 200, description = "Options", body = Options),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn get_options(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Options>, AppError> {
    Ok(Json(Store::new(&state.db).ensure_options().await?))
}

#[utoipa::path(
    post,
    path = "/admin/options",
    tag = "Admin",
    operation_id = "updateOptions",
    summary = "Update event options",
    description = "Only the fields present in the body are changed.",
    request_body = OptionsUpdate,
    responses(
        (status = 200, description = "Updated options", body = Options),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_options(
    _admin: AdminAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<OptionsUpdate>,
) -> Result<Json<Options>, AppError> {
    Ok(Json(event::update_options(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/admin/log",
    tag = "Admin",
    operation_id = "eventLog",
    summary = "Event log",
    responses(
        (status = 200, description = "Log entries, oldest first", body = LogResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn event_log(_admin: AdminAuth, State(state): State<AppState>) -> Json<LogResponse> {
    Json(LogResponse {
        ok: 1,
        entries: state.logger.entries().await,
    })
}

#[utoipa::path(
    get,
    path = "/admin/matrix",
    tag = "Results",
    operation_id = "comparisonMatrix",
    summary = "Pairwise seen-together counts",
    responses(
        (status = 200, description = "Matrix snapshot", body = MatrixSnapshot),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn matrix(_admin: AdminAuth, State(state): State<AppState>) -> Json<MatrixSnapshot> {
    Json(state.matrix.snapshot())
}
