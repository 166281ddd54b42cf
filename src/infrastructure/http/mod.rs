use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::auth::JwtManager;
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::Store;
use crate::{
    controllers::{
        analysis::AnalysisController, health, payment::PaymentController,
        settings::SettingsController, usage::UsageController,
    },
    infrastructure::auth::{auth_middleware, request_id_middleware},
};

/// Photos arrive base64-encoded inside JSON, well above axum's 2 MB default
const MAX_ANALYZE_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Controllers served under `/api`
#[derive(Clone)]
pub struct Controllers {
    pub settings: Arc<SettingsController>,
    pub usage: Arc<UsageController>,
    pub analysis: Arc<AnalysisController>,
    pub payment: Arc<PaymentController>,
}

/// Build the application router with all routes configured
pub fn build_router(
    store: Arc<dyn Store>,
    jwt_manager: Arc<JwtManager>,
    controllers: Controllers,
) -> Router {
    // Settings routes (require authentication)
    let settings_routes = Router::new()
        .route(
            "/api/settings",
            get(SettingsController::get_settings).put(SettingsController::update_settings),
        )
        .route("/api/settings/test-key", post(SettingsController::test_key))
        .with_state(controllers.settings)
        .layer(middleware::from_fn_with_state(
            jwt_manager.clone(),
            auth_middleware,
        ));

    // Usage route (requires authentication)
    let usage_routes = Router::new()
        .route("/api/usage", get(UsageController::get_usage))
        .with_state(controllers.usage)
        .layer(middleware::from_fn_with_state(
            jwt_manager.clone(),
            auth_middleware,
        ));

    // Analysis route (requires authentication)
    let analysis_routes = Router::new()
        .route("/api/analyze", post(AnalysisController::analyze))
        .with_state(controllers.analysis)
        .layer(DefaultBodyLimit::max(MAX_ANALYZE_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            jwt_manager.clone(),
            auth_middleware,
        ));

    // Plan and payment routes (require authentication)
    let payment_routes = Router::new()
        .route("/api/plans", get(PaymentController::list_plans))
        .route(
            "/api/payments",
            get(PaymentController::list_payments).post(PaymentController::create_payment),
        )
        .with_state(controllers.payment)
        .layer(middleware::from_fn_with_state(jwt_manager, auth_middleware));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(store)
        .merge(settings_routes)
        .merge(usage_routes)
        .merge(analysis_routes)
        .merge(payment_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind the configured address and serve the router until shutdown
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
