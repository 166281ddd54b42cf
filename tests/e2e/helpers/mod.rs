use axum::Router;
use homework_checker_backend::controllers::{
    analysis::AnalysisController, payment::PaymentController, settings::SettingsController,
    usage::UsageController,
};
use homework_checker_backend::domain::analysis::{AnalysisService, ImageCompressor, RetryPolicy};
use homework_checker_backend::domain::auth::JwtManager;
use homework_checker_backend::domain::payment::{PaymentDraw, PaymentService};
use homework_checker_backend::domain::settings::SettingsService;
use homework_checker_backend::domain::usage::UsageTracker;
use homework_checker_backend::infrastructure::config::{Config, Environment, LogFormat};
use homework_checker_backend::infrastructure::http::{build_router, Controllers};
use homework_checker_backend::infrastructure::repositories::{
    ArkVisionRepository, InMemoryStore, PaymentRepository, SettingsRepository, Store,
    UsageRepository, VisionRepository,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod mock_vision;

use api_client::TestClient;
use fixtures::TestFixtures;
use mock_vision::{spawn_mock_vision_api, MockVisionApi};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-key-for-testing-only";
pub const TEST_DEMO_KEY: &str = "demo-operator-key";

/// Payment draw the test controls. Starts at 0.0, which always succeeds.
#[derive(Default)]
pub struct FixedDraw(AtomicU64);

impl FixedDraw {
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::SeqCst);
    }
}

impl PaymentDraw for FixedDraw {
    fn draw(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }
}

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub config: Config,
    pub vision_api: Arc<MockVisionApi>,
    pub payment_draw: Arc<FixedDraw>,
    pub fixtures: TestFixtures,
}

impl TestContext {
    /// A fresh user id with a valid bearer token
    pub fn new_user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = generate_test_jwt(&user_id, TEST_JWT_SECRET);
        (user_id, token)
    }

    /// Serve the app over `store`, letting the caller adjust the test config
    pub async fn start(store: Arc<dyn Store>, customize: impl FnOnce(&mut Config)) -> Self {
        let vision_api = Arc::new(MockVisionApi::default());
        let endpoint = spawn_mock_vision_api(vision_api.clone()).await;

        let mut config = Config {
            host: "127.0.0.1".to_string(),
            port: 0, // Will be assigned by the OS
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiration_hours: 1,
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            database_url: None,
            ark_api_endpoint: endpoint,
            ark_model: "test-model".to_string(),
            demo_api_key: Some(TEST_DEMO_KEY.to_string()),
            request_timeout_secs: 5,
            max_retries: 3,
            retry_base_delay_ms: 10, // Keep retry tests fast
            max_image_bytes: 1024 * 1024,
            max_image_dimension: 1200,
            jpeg_quality: 80,
            max_free_usage: 10,
            payment_delay_ms: 0,
            payment_success_rate: 0.9,
        };
        customize(&mut config);

        let payment_draw = Arc::new(FixedDraw::default());

        let app = create_app(&config, store.clone(), payment_draw.clone())
            .expect("Failed to create app");

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: TestClient::new(&base_url),
            config,
            vision_api,
            payment_draw,
            fixtures: TestFixtures::new(store),
        }
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { Self::start(Arc::new(InMemoryStore::new()), |_| {}).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The in-memory store is dropped with the context
        }
    }
}

fn create_app(
    config: &Config,
    store: Arc<dyn Store>,
    payment_draw: Arc<FixedDraw>,
) -> anyhow::Result<Router> {
    // Instantiate repositories
    let settings_repo = Arc::new(SettingsRepository::new(store.clone()));
    let usage_repo = Arc::new(UsageRepository::new(store.clone()));
    let payment_repo = Arc::new(PaymentRepository::new(store.clone()));
    let vision_repo: Arc<dyn VisionRepository> = Arc::new(ArkVisionRepository::new(
        config.ark_api_endpoint.clone(),
        config.ark_model.clone(),
        Duration::from_secs(config.request_timeout_secs),
        RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        ),
    )?);

    // Instantiate services
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
        payment_draw,
        Duration::from_millis(config.payment_delay_ms),
        config.payment_success_rate,
    ));

    // Instantiate controllers
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

    Ok(build_router(store, jwt_manager, controllers))
}

// Helper to generate valid JWT tokens for testing
pub fn generate_test_jwt(user_id: &Uuid, secret: &str) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
        iat: i64,
    }

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
