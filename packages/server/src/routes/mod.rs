use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/judge", judge_routes())
        .nest("/project", project_routes())
        .nest("/admin", admin_routes())
}

fn judge_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::judge::me))
        .route("/login", post(handlers::judge::login))
        .route("/auth", post(handlers::judge::auth))
        .route(
            "/welcome",
            get(handlers::judge::get_welcome).post(handlers::judge::set_welcome),
        )
        .route("/next", post(handlers::judge::next))
        .route("/skip", post(handlers::judge::skip))
        .route("/finish", post(handlers::judge::finish))
        .route("/rank", post(handlers::judge::rank))
        .route("/projects", get(handlers::judge::seen_projects))
        .route("/star/{id}", put(handlers::judge::star))
        .route("/notes/{id}", put(handlers::judge::notes))
        .route("/new", post(handlers::judge::create_judge))
        .route("/csv", post(handlers::judge::import_judges))
        .route("/list", get(handlers::judge::list_judges))
        .route("/stats", get(handlers::judge::judge_stats))
        .route("/hide/{id}", put(handlers::judge::hide_judge))
        .route("/unhide/{id}", put(handlers::judge::unhide_judge))
        .route("/{id}", delete(handlers::judge::delete_judge))
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(handlers::project::create_project))
        .route("/devpost", post(handlers::project::import_devpost))
        .route("/csv", post(handlers::project::import_projects))
        .route("/list", get(handlers::project::list_projects))
        .route("/list/public", get(handlers::project::list_public_projects))
        .route("/count", get(handlers::project::count_projects))
        .route("/stats", get(handlers::project::project_stats))
        .route("/hide/{id}", put(handlers::project::hide_project))
        .route("/unhide/{id}", put(handlers::project::unhide_project))
        .route("/prioritize/{id}", put(handlers::project::prioritize_project))
        .route(
            "/unprioritize/{id}",
            put(handlers::project::unprioritize_project),
        )
        .route(
            "/{id}",
            get(handlers::project::get_project).delete(handlers::project::delete_project),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::admin::login))
        .route("/auth", post(handlers::admin::auth))
        .route("/stats", get(handlers::admin::stats))
        .route("/clock", get(handlers::admin::get_clock))
        .route("/clock/pause", post(handlers::admin::pause_clock))
        .route("/clock/unpause", post(handlers::admin::resume_clock))
        .route("/clock/reset", post(handlers::admin::reset_clock))
        .route("/reset", post(handlers::admin::reset))
        .route("/flags", get(handlers::admin::list_flags))
        .route("/score", get(handlers::admin::scores))
        .route("/rankings", get(handlers::admin::orderings))
        .route(
            "/options",
            get(handlers::admin::get_options).post(handlers::admin::update_options),
        )
        .route("/log", get(handlers::admin::event_log))
        .route("/matrix", get(handlers::admin::matrix))
}
