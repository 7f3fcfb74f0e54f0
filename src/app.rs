use std::sync::Arc;

use axum::http::Method;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::edge::{edge_interceptor, EdgeConfig};
use crate::authz::{approval_notice, ApprovalModeSource};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::events::{init_event_bus, start_audit_listener, EventBus};
use crate::routes::{admin, dashboard, departments, health, pages, profile, roles};
use crate::session::SessionConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub session: Arc<SessionConfig>,
    pub approval: ApprovalModeSource,
    pub edge: Arc<EdgeConfig>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig, event_bus: EventBus) -> Self {
        Self {
            pool,
            session: Arc::new(config.session),
            approval: config.approval,
            edge: Arc::new(config.edge),
            event_bus,
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let config = AppConfig::from_env()?;
    create_app_with_config(pool, config).await
}

/// Builds the router and spawns the audit listener on the current runtime.
pub async fn create_app_with_config(pool: SqlitePool, config: AppConfig) -> Result<Router, AppError> {
    let (event_bus, rx) = init_event_bus();
    tokio::spawn(start_audit_listener(rx, pool.clone()));

    let state = AppState::new(pool, config, event_bus);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let department_routes = Router::new()
        .route("/", get(departments::list_departments).post(departments::create_department))
        .route(
            "/:id",
            get(departments::get_department)
                .patch(departments::update_department)
                .delete(departments::delete_department),
        );

    let role_routes = Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route(
            "/:id",
            get(roles::get_role).patch(roles::update_role).delete(roles::delete_role),
        );

    let admin_routes = Router::new()
        .route("/profiles", get(admin::list_profiles))
        .route("/profiles/:user_id", axum::routing::patch(admin::update_profile));

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route(
            "/profile",
            get(profile::get_profile).post(profile::create_profile).patch(profile::update_profile),
        )
        .route("/dashboard", get(dashboard::dashboard))
        .nest("/departments", department_routes)
        .nest("/roles", role_routes)
        .nest("/admin", admin_routes);

    let page_routes = Router::new()
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .route("/forbidden", get(pages::forbidden))
        .route("/admin", get(pages::admin))
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile));

    let router = Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .layer(middleware::from_fn(approval_notice))
        .layer(middleware::from_fn_with_state(state.clone(), edge_interceptor))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
