use anyhow::{anyhow, Context};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homework_checker_backend::controllers::{
    analysis::AnalysisController, payment::PaymentController, settings::SettingsController,
    usage::UsageController,
};
use homework_checker_backend::domain::analysis::{AnalysisService, ImageCompressor, RetryPolicy};
use homework_checker_backend::domain::auth::JwtManager;
use homework_checker_backend::domain::payment::{PaymentService, ThreadRngDraw};
use homework_checker_backend::domain::settings::SettingsService;
use homework_checker_backend::domain::usage::UsageTracker;
use homework_checker_backend::infrastructure::config::{Config, LogFormat};
use homework_checker_backend::infrastructure::db::{check_connection, create_pool, ensure_schema};
use homework_checker_backend::infrastructure::http::{build_router, start_http_server, Controllers};
use homework_checker_backend::infrastructure::repositories::{
    ArkVisionRepository, InMemoryStore, PaymentRepository, PostgresStore, SettingsRepository,
    Store, UsageRepository, VisionRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow!("invalid configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        development = config.is_development(),
        "Starting Homework Checker Backend on {}:{}",
        config.host,
        config.port
    );

    // Pick the store backend
    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url)
                .await
                .context("failed to create database pool")?;
            check_connection(&pool)
                .await
                .context("database is not reachable")?;
            ensure_schema(&pool)
                .await
                .context("failed to prepare database schema")?;
            tracing::info!("Using Postgres store");
            Arc::new(PostgresStore::new(Arc::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    if config.demo_api_key.is_none() {
        tracing::warn!("DEMO_API_KEY not set; users must configure their own API key");
    }

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (inject store)
    tracing::info!("Instantiating repositories...");
    let settings_repo = Arc::new(SettingsRepository::new(store.clone()));
    let usage_repo = Arc::new(UsageRepository::new(store.clone()));
    let payment_repo = Arc::new(PaymentRepository::new(store.clone()));
    let vision_repo: Arc<dyn VisionRepository> = Arc::new(
        ArkVisionRepository::new(
            config.ark_api_endpoint.clone(),
            config.ark_model.clone(),
            Duration::from_secs(config.request_timeout_secs),
            RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.retry_base_delay_ms),
            ),
        )
        .context("failed to build vision API client")?,
    );

    // 2. Instantiate services (inject repositories)
    tracing::info!("Instantiating services...");
    let jwt_manager = Arc::new(JwtManager::new(
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
    ));
    let usage_tracker = Arc::new(UsageTracker::new(
        settings_repo.clone(),
        usage_repo,
        config.max_free_usage,
    ));
    let settings_service = Arc::new(SettingsService::new(
        settings_repo.clone(),
        vision_repo.clone(),
    ));
    let analysis_service = Arc::new(AnalysisService::new(
        settings_repo,
        usage_tracker.clone(),
        vision_repo,
        ImageCompressor::new(
            config.max_image_bytes,
            config.max_image_dimension,
            config.jpeg_quality,
        ),
        config.demo_api_key.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_repo,
        usage_tracker.clone(),
        Arc::new(ThreadRngDraw),
        Duration::from_millis(config.payment_delay_ms),
        config.payment_success_rate,
    ));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let controllers = Controllers {
        settings: Arc::new(SettingsController::new(settings_service.clone())),
        usage: Arc::new(UsageController::new(usage_tracker.clone())),
        analysis: Arc::new(AnalysisController::new(
            analysis_service,
            settings_service,
            usage_tracker,
        )),
        payment: Arc::new(PaymentController::new(payment_service)),
    };

    // Start HTTP server with all routes
    let app = build_router(store, jwt_manager, controllers);
    start_http_server(config, app)
        .await
        .map_err(|e| anyhow!("server error: {}", e))?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "homework_checker_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
