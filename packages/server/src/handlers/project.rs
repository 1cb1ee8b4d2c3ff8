use axum::Json;
use axum::extract::{Path, State};
use jury_core::{Project, ProjectId};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminAuth;
use crate::extractors::json::AppJson;
use crate::extractors::upload::CsvUpload;
use crate::models::project::*;
use crate::models::shared::{CountResponse, OkResponse};
use crate::service::catalog;
use crate::state::AppState;
use crate::store::Store;
use crate::utils::import::{parse_devpost, parse_projects};

#[utoipa::path(
    post,
    path = "/project/new",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Add a project",
    description = "The project is given the next free table number in its group.",
    request_body = NewProjectRequest,
    responses(
        (status = 200, description = "Project created", body = Project),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(name = %payload.name))]
pub async fn create_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let project = catalog::add_project(&state, payload.validate()?).await?;
    Ok(Json(project))
}

#[utoipa::path(
    post,
    path = "/project/devpost",
    tag = "Projects",
    operation_id = "importDevpost",
    summary = "Import a Devpost submissions export",
    description = "Multipart upload with a `csv` file field. Draft submissions are skipped.",
    request_body(content_type = "multipart/form-data", description = "Devpost CSV export"),
    responses(
        (status = 200, description = "Projects created", body = ImportResponse),
        (status = 400, description = "Malformed CSV (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin, upload), fields(bytes = upload.data.len()))]
pub async fn import_devpost(
    _admin: AdminAuth,
    State(state): State<AppState>,
    upload: CsvUpload,
) -> Result<Json<ImportResponse>, AppError> {
    let drafts = parse_devpost(&upload.data)?;
    let added = catalog::add_projects(&state, drafts).await?.len();
    Ok(Json(ImportResponse { ok: 1, added }))
}

#[utoipa::path(
    post,
    path = "/project/csv",
    tag = "Projects",
    operation_id = "importProjects",
    summary = "Import projects from CSV",
    description = "Multipart upload with a `csv` file field (name,description,url,try_link,video_link,challenge_list) and an optional `hasHeader` field.",
    request_body(content_type = "multipart/form-data", description = "CSV upload"),
    responses(
        (status = 200, description = "Projects created", body = ImportResponse),
        (status = 400, description = "Malformed CSV (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin, upload), fields(bytes = upload.data.len()))]
pub async fn import_projects(
    _admin: AdminAuth,
    State(state): State<AppState>,
    upload: CsvUpload,
) -> Result<Json<ImportResponse>, AppError> {
    let drafts = parse_projects(&upload.data, upload.has_header)?;
    let added = catalog::add_projects(&state, drafts).await?.len();
    Ok(Json(ImportResponse { ok: 1, added }))
}

#[utoipa::path(
    get,
    path = "/project/list",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List all projects",
    responses(
        (status = 200, description = "All projects", body = Vec<Project>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn list_projects(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(Store::new(&state.db).find_projects().await?))
}

#[utoipa::path(
    get,
    path = "/project/list/public",
    tag = "Projects",
    operation_id = "listPublicProjects",
    summary = "Public listing of active projects",
    responses(
        (status = 200, description = "Active projects", body = Vec<PublicProject>),
    ),
)]
pub async fn list_public_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicProject>>, AppError> {
    let projects = Store::new(&state.db).find_active_projects().await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/project/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project by ID",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 400, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn get_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<Project>, AppError> {
    Store::new(&state.db)
        .find_project(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))
}

#[utoipa::path(
    delete,
    path = "/project/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a project",
    description = "Judges currently assigned to the project are released.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted", body = OkResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 500, description = "Project does not exist (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<OkResponse>, AppError> {
    catalog::delete_project(&state, id).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    get,
    path = "/project/count",
    tag = "Projects",
    operation_id = "countProjects",
    summary = "Number of projects",
    responses(
        (status = 200, description = "Project count", body = CountResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn count_projects(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, AppError> {
    let count = Store::new(&state.db).count_projects().await?;
    Ok(Json(CountResponse { ok: 1, count }))
}

#[utoipa::path(
    get,
    path = "/project/stats",
    tag = "Projects",
    operation_id = "projectStats",
    summary = "Project counters",
    responses(
        (status = 200, description = "Project counters", body = ProjectStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
pub async fn project_stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ProjectStatsResponse>, AppError> {
    let stats = Store::new(&state.db).aggregate_stats().await?;
    Ok(Json(ProjectStatsResponse {
        num: stats.projects,
        num_active: stats.active_projects,
        avg_seen: stats.avg_project_seen,
    }))
}

#[utoipa::path(
    put,
    path = "/project/hide/{id}",
    tag = "Projects",
    operation_id = "hideProject",
    summary = "Hide a project",
    description = "Hidden projects are not assigned; judges currently at the project are released.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project hidden", body = OkResponse),
        (status = 400, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn hide_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<OkResponse>, AppError> {
    catalog::set_project_active(&state, id, false).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    put,
    path = "/project/unhide/{id}",
    tag = "Projects",
    operation_id = "unhideProject",
    summary = "Unhide a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project visible", body = OkResponse),
        (status = 400, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn unhide_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<OkResponse>, AppError> {
    catalog::set_project_active(&state, id, true).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    put,
    path = "/project/prioritize/{id}",
    tag = "Projects",
    operation_id = "prioritizeProject",
    summary = "Prioritize a project",
    description = "Prioritized projects are preferred during assignment.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project prioritized", body = OkResponse),
        (status = 400, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn prioritize_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<OkResponse>, AppError> {
    catalog::set_project_prioritized(&state, id, true).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    put,
    path = "/project/unprioritize/{id}",
    tag = "Projects",
    operation_id = "unprioritizeProject",
    summary = "Clear a project's priority",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Priority cleared", body = OkResponse),
        (status = 400, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, INVALID_CREDENTIALS)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn unprioritize_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<OkResponse>, AppError> {
    catalog::set_project_prioritized(&state, id, false).await?;
    Ok(Json(OkResponse::new()))
}
