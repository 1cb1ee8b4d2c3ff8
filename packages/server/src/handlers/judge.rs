use axum::Json;
use axum::extract::{Path, State};
use jury_core::{JudgeId, JudgedProject, ProjectId};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminAuth, JudgeAuth};
use crate::extractors::json::AppJson;
use crate::extractors::upload::CsvUpload;
use crate::models::judge::*;
use crate::models::project::ImportResponse;
use crate::models::shared::OkResponse;
use crate::service::{catalog, judging};
use crate::state::AppState;
use crate::store::Store;
use crate::utils::import::parse_judges;

#[utoipa::path(
    post,
    path = "/judge/login",
    tag = "Judge",
    operation_id = "judgeLogin",
    summary = "Log in with a judge code",
    description = "Exchanges the six-digit login code for a bearer token. Logging in again revokes the previous token.",
    request_body = JudgeLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = JudgeLoginResponse),
        (status = 401, description = "Unknown code (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<JudgeLoginRequest>,
) -> Result<Json<JudgeLoginResponse>, AppError> {
    let (_, token) = judging::login(&state, &payload.code).await?;
    Ok(Json(JudgeLoginResponse { ok: 1, token }))
}

#[utoipa::path(
    post,
    path = "/judge/auth",
    tag = "Judge",
    operation_id = "judgeAuth",
    summary = "Check a judge token",
    responses(
        (status = 200, description = "Token is valid", body = OkResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn auth(_judge: JudgeAuth) -> Json<OkResponse> {
    Json(OkResponse::new())
}

#[utoipa::path(
    get,
    path = "/judge",
    tag = "Judge",
    operation_id = "getSelf",
    summary = "Get the calling judge's record",
    responses(
        (status = 200, description = "Judge record", body = JudgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn me(auth: JudgeAuth) -> Json<JudgeResponse> {
    Json(auth.judge.into())
}

#[utoipa::path(
    get,
    path = "/judge/welcome",
    tag = "Judge",
    operation_id = "getWelcome",
    summary = "Whether the judge has read the welcome screen",
    responses(
        (status = 200, description = "Read-welcome flag", body = WelcomeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn get_welcome(auth: JudgeAuth) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        ok: 1,
        read_welcome: auth.judge.read_welcome,
    })
}

#[utoipa::path(
    post,
    path = "/judge/welcome",
    tag = "Judge",
    operation_id = "setWelcome",
    summary = "Mark the welcome screen as read",
    responses(
        (status = 200, description = "Flag set", body = OkResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth), fields(judge_id = auth.judge.id))]
pub async fn set_welcome(
    auth: JudgeAuth,
    State(state): State<AppState>,
) -> Result<Json<OkResponse>, AppError> {
    judging::set_read_welcome(&state, auth.judge.id).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/judge/next",
    tag = "Judging",
    operation_id = "nextProject",
    summary = "Get the next project to judge",
    description = "Returns the judge's current project, assigning a new one first if they have none. `no_more` is set once every eligible project has been judged or flagged.",
    responses(
        (status = 200, description = "Assignment", body = AssignmentResponse),
        (status = 400, description = "Judge is hidden (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Assigned project vanished (INVARIANT_VIOLATION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth), fields(judge_id = auth.judge.id))]
pub async fn next(
    auth: JudgeAuth,
    State(state): State<AppState>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let project = judging::pick_initial(&state, auth.judge.id).await?;
    Ok(Json(project.into()))
}

#[utoipa::path(
    post,
    path = "/judge/skip",
    tag = "Judging",
    operation_id = "skipProject",
    summary = "Skip the current project",
    description = "Leaves the current project. Absent, busy and cannot-demo skips are recorded as flags. With `get_new` a replacement is assigned in the same step.",
    request_body = SkipRequest,
    responses(
        (status = 200, description = "Skipped", body = AssignmentResponse),
        (status = 400, description = "No current project (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, payload), fields(judge_id = auth.judge.id, reason = %payload.reason))]
pub async fn skip(
    auth: JudgeAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SkipRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let next = judging::skip(&state, auth.judge.id, payload.reason, payload.get_new).await?;
    Ok(Json(AssignmentResponse {
        ok: 1,
        no_more: payload.get_new && next.is_none(),
        project: next,
    }))
}

#[utoipa::path(
    post,
    path = "/judge/finish",
    tag = "Judging",
    operation_id = "finishProject",
    summary = "Complete the current project",
    request_body = FinishRequest,
    responses(
        (status = 200, description = "Project completed", body = OkResponse),
        (status = 400, description = "No current project or already judged (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, payload), fields(judge_id = auth.judge.id, starred = payload.starred))]
pub async fn finish(
    auth: JudgeAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<FinishRequest>,
) -> Result<Json<OkResponse>, AppError> {
    judging::vote(&state, auth.judge.id, payload.starred, payload.notes).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/judge/rank",
    tag = "Judging",
    operation_id = "rankProjects",
    summary = "Replace the judge's ranking",
    request_body = RankRequest,
    responses(
        (status = 200, description = "Ranking stored", body = OkResponse),
        (status = 400, description = "Duplicate or unseen project (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, payload), fields(judge_id = auth.judge.id))]
pub async fn rank(
    auth: JudgeAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RankRequest>,
) -> Result<Json<OkResponse>, AppError> {
    judging::rank(&state, auth.judge.id, payload.ranking).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    get,
    path = "/judge/projects",
    tag = "Judging",
    operation_id = "listSeenProjects",
    summary = "Projects the judge has completed",
    responses(
        (status = 200, description = "Completed projects in order", body = Vec<JudgedProject>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn seen_projects(auth: JudgeAuth) -> Json<Vec<JudgedProject>> {
    Json(auth.judge.seen_projects)
}

#[utoipa::path(
    put,
    path = "/judge/star/{id}",
    tag = "Judging",
    operation_id = "starProject",
    summary = "Star or unstar a completed project",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = StarRequest,
    responses(
        (status = 200, description = "Star updated", body = OkResponse),
        (status = 400, description = "Project not seen (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, payload), fields(judge_id = auth.judge.id))]
pub async fn star(
    auth: JudgeAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    AppJson(payload): AppJson<StarRequest>,
) -> Result<Json<OkResponse>, AppError> {
    judging::set_star(&state, auth.judge.id, id, payload.starred).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    put,
    path = "/judge/notes/{id}",
    tag = "Judging",
    operation_id = "updateNotes",
    summary = "Edit notes on a completed project",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = NotesRequest,
    responses(
        (status = 200, description = "Notes updated", body = OkResponse),
        (status = 400, description = "Project not seen (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, payload), fields(judge_id = auth.judge.id))]
pub async fn notes(
    auth: JudgeAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    AppJson(payload): AppJson<NotesRequest>,
) -> Result<Json<OkResponse>, AppError> {
    judging::set_notes(&state, auth.judge.id, id, payload.notes).await?;
    Ok(Json(OkResponse::new()))
}

// ---- admin ----------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/judge/new",
    tag = "Judge Admin",
    operation_id = "createJudge",
    summary = "Add a judge",
    request_body = NewJudgeRequest,
    responses(
        (status = 200, description = "Judge created", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(name = %payload.name))]
pub async fn create_judge(
    _admin: AdminAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewJudgeRequest>,
) -> Result<Json<JudgeResponse>, AppError> {
    let judge = catalog::add_judge(&state, payload.validate()?).await?;
    Ok(Json(judge.into()))
}

#[utoipa::path(
    post,
    path = "/judge/csv",
    tag = "Judge Admin",
    operation_id = "importJudges",
    summary = "Add judges from CSV",
    description = "Multipart upload with a `csv` file field (name,email,notes) and an optional `hasHeader` field. All rows are added in one transaction.",
    request_body(content_type = "multipart/form-data", description = "CSV upload"),
    responses(
        (status = 200, description = "Judges created", body = ImportResponse),
        (status = 400, description = "Malformed CSV (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin, upload), fields(bytes = upload.data.len()))]
pub async fn import_judges(
    _admin: AdminAuth,
    State(state): State<AppState>,
    upload: CsvUpload,
) -> Result<Json<ImportResponse>, AppError> {
    let drafts = parse_judges(&upload.data, upload.has_header)?;
    let added = catalog::add_judges(&state, drafts).await?.len();
    Ok(Json(ImportResponse { ok: 1, added }))
}

#[utoipa::path(
    get,
    path = "/judge/list",
    tag = "Judge Admin",
    operation_id = "listJudges",
    summary = "List all judges",
    responses(
        (status = 200, description = "All judges", body = Vec<JudgeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn list_judges(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<JudgeResponse>>, AppError> {
    let judges = Store::new(&state.db).find_judges().await?;
    Ok(Json(judges.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/judge/stats",
    tag = "Judge Admin",
    operation_id = "judgeStats",
    summary = "Judge counters",
    responses(
        (status = 200, description = "Judge counters", body = JudgeStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn judge_stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<JudgeStatsResponse>, AppError> {
    let stats = Store::new(&state.db).aggregate_stats().await?;
    Ok(Json(JudgeStatsResponse {
        num: stats.judges,
        num_active: stats.active_judges,
        avg_seen: stats.avg_judge_seen,
    }))
}

#[utoipa::path(
    delete,
    path = "/judge/{id}",
    tag = "Judge Admin",
    operation_id = "deleteJudge",
    summary = "Delete a judge",
    description = "Releases the judge's current project and withdraws their completed projects from the comparison matrix.",
    params(("id" = i32, Path, description = "Judge ID")),
    responses(
        (status = 200, description = "Judge deleted", body = OkResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 500, description = "Judge does not exist (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_judge(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<JudgeId>,
) -> Result<Json<OkResponse>, AppError> {
    catalog::delete_judge(&state, id).await?;
    Ok(Json(OkResponse::new()))
}

async fn set_active(state: &AppState, id: JudgeId, active: bool) -> Result<Json<OkResponse>, AppError> {
    catalog::set_judge_active(state, id, active).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    put,
    path = "/judge/hide/{id}",
    tag = "Judge Admin",
    operation_id = "hideJudge",
    summary = "Hide a judge",
    description = "Hidden judges receive no assignments; their current project is released.",
    params(("id" = i32, Path, description = "Judge ID")),
    responses(
        (status = 200, description = "Judge hidden", body = OkResponse),
        (status = 400, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn hide_judge(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<JudgeId>,
) -> Result<Json<OkResponse>, AppError> {
    set_active(&state, id, false).await
}

#[utoipa::path(
    put,
    path = "/judge/unhide/{id}",
    tag = "Judge Admin",
    operation_id = "unhideJudge",
    summary = "Unhide a judge",
    params(("id" = i32, Path, description = "Judge ID")),
    responses(
        (status = 200, description = "Judge visible", body = OkResponse),
        (status = 400, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn unhide_judge(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<JudgeId>,
) -> Result<Json<OkResponse>, AppError> {
    set_active(&state, id, true).await
}
