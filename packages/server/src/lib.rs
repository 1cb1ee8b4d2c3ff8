pub mod bootstrap;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logger;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jury API",
        version = "1.0.0",
        description = "Project assignment and ranking for hackathon judging"
    ),
    paths(
        handlers::judge::login,
        handlers::judge::auth,
        handlers::judge::me,
        handlers::judge::get_welcome,
        handlers::judge::set_welcome,
        handlers::judge::next,
        handlers::judge::skip,
        handlers::judge::finish,
        handlers::judge::rank,
        handlers::judge::seen_projects,
        handlers::judge::star,
        handlers::judge::notes,
        handlers::judge::create_judge,
        handlers::judge::import_judges,
        handlers::judge::list_judges,
        handlers::judge::judge_stats,
        handlers::judge::delete_judge,
        handlers::judge::hide_judge,
        handlers::judge::unhide_judge,
        handlers::project::create_project,
        handlers::project::import_devpost,
        handlers::project::import_projects,
        handlers::project::list_projects,
        handlers::project::list_public_projects,
        handlers::project::get_project,
        handlers::project::delete_project,
        handlers::project::count_projects,
        handlers::project::project_stats,
        handlers::project::hide_project,
        handlers::project::unhide_project,
        handlers::project::prioritize_project,
        handlers::project::unprioritize_project,
        handlers::admin::login,
        handlers::admin::auth,
        handlers::admin::stats,
        handlers::admin::get_clock,
        handlers::admin::pause_clock,
        handlers::admin::resume_clock,
        handlers::admin::reset_clock,
        handlers::admin::reset,
        handlers::admin::list_flags,
        handlers::admin::scores,
        handlers::admin::orderings,
        handlers::admin::get_options,
        handlers::admin::update_options,
        handlers::admin::event_log,
        handlers::admin::matrix,
    ),
    tags(
        (name = "Judge", description = "Judge login and session"),
        (name = "Judging", description = "Assignment, skips, completion and ranking"),
        (name = "Judge Admin", description = "Judge management"),
        (name = "Projects", description = "Project management and import"),
        (name = "Admin", description = "Event administration"),
        (name = "Clock", description = "Judging clock"),
        (name = "Results", description = "Score aggregation"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    routes::api_routes()
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(cors)
}
