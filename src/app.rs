use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{gatekeeper, ApiResponse};
use crate::state::AppState;

/// The full application: routes behind the gatekeeper, wrapped in CORS and tracing
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(page_routes())
        .merge(auth_routes())
        .merge(team_routes())
        .merge(project_routes())
        .merge(thread_routes())
        .merge(admin_routes())
        // Unknown paths still go through the gatekeeper before answering 404
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(state.clone(), gatekeeper))
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(public::pages::login))
        .route("/register", get(public::pages::register))
        .route("/dashboard", get(protected::pages::dashboard))
        .route("/dashboard/*rest", get(protected::pages::dashboard))
        .route("/coordinator", get(protected::pages::coordinator))
        .route("/coordinator/*rest", get(protected::pages::coordinator))
        .route("/admin", get(protected::pages::admin))
        .route("/admin/*rest", get(protected::pages::admin))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/login", post(public::login))
        .route("/api/auth/register", post(public::register))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/change-password", post(auth::change_password))
}

fn team_routes() -> Router<AppState> {
    use protected::{members, teams};

    Router::new()
        .route("/api/teams", get(teams::list).post(teams::create))
        .route("/api/teams/all", get(teams::list_all))
        .route("/api/teams/status", patch(teams::update_status))
        .route("/api/teams/evaluate", post(teams::evaluate))
        .route(
            "/api/teams/members",
            post(members::add).put(members::update).delete(members::remove),
        )
        .route("/api/teams/:id", get(teams::show).delete(teams::delete))
}

fn project_routes() -> Router<AppState> {
    use protected::projects;

    Router::new()
        .route("/api/projects", get(projects::list).post(projects::create))
        .route("/api/projects/apply", post(projects::apply))
}

fn thread_routes() -> Router<AppState> {
    use protected::{messages, observations};

    Router::new()
        .route("/api/observations", get(observations::list).post(observations::create))
        .route("/api/messages", get(messages::list).post(messages::create))
}

fn admin_routes() -> Router<AppState> {
    use elevated::admin;

    Router::new()
        .route("/api/admin/users", get(admin::list_users).patch(admin::update_user))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/coordinators", post(admin::create_coordinator))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            // A wildcard cannot be combined with credentials
            _ if origin.trim() == "*" => {
                tracing::warn!("Ignoring wildcard CORS origin");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Only reached if the gatekeeper lets `/` through, which it never does
async fn root() -> Redirect {
    Redirect::to("/login")
}

async fn not_found() -> crate::error::ApiError {
    crate::error::ApiError::not_found("Not found")
}

async fn method_not_allowed() -> crate::error::ApiError {
    crate::error::ApiError::method_not_allowed("Method not allowed")
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: &'static str,
    version: &'static str,
}

/// GET /health - Liveness plus a database ping
async fn health(State(state): State<AppState>) -> Response {
    let version = env!("CARGO_PKG_VERSION");

    match state.db.health_check().await {
        Ok(()) => ApiResponse::success(Health {
            status: "ok",
            database: "ok",
            version,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiResponse::with_status(
                Health {
                    status: "degraded",
                    database: "unavailable",
                    version,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            )
            .into_response()
        }
    }
}
