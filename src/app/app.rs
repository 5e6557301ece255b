use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::app_conf::AppConfig;
use crate::config::{AuthUsersConfig, DatabaseConfig, JwtConfig, MinioConfig, PricingConfig};
use crate::handler::auth_handler::AuthState;
use crate::middlewares::auth_middleware::AuthLayerState;
use crate::repository::db;
use crate::repository::file_repo::SqliteFileRepository;
use crate::repository::material_price_repo::SqliteMaterialPriceRepository;
use crate::repository::notification_repo::SqliteNotificationRepository;
use crate::repository::quote_notification_repo::SqliteQuoteNotificationRepository;
use crate::repository::quote_repo::SqliteQuoteRepository;
use crate::router::auth_router::auth_router;
use crate::router::file_router::file_router;
use crate::router::notification_router::notification_router;
use crate::router::pricing_router::{live_rates_router, pricing_router};
use crate::router::quote_router::quote_router;
use crate::service::cascade::CascadeDeleteService;
use crate::service::file_service::FileServiceImpl;
use crate::service::notification_service::NotificationServiceImpl;
use crate::service::pricing_service::PricingServiceImpl;
use crate::service::quote_service::QuoteServiceImpl;
use crate::service::rate_cache::MaterialRateCache;
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::minio::{MinioService, ObjectStore};

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();

        let database_config = DatabaseConfig::from_env().expect("Database config error");
        let minio_config = MinioConfig::from_env().expect("Minio config error");
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let auth_users = AuthUsersConfig::from_env().expect("Auth users config error");
        let pricing_config = PricingConfig::from_env().expect("Pricing config error");

        let pool = db::connect(&database_config)
            .await
            .expect("Database connection error");

        let minio_service = Arc::new(
            MinioService::new(minio_config)
                .await
                .expect("Minio service error"),
        );
        let object_store: Arc<dyn ObjectStore> = minio_service;

        let file_repo = Arc::new(SqliteFileRepository::new(pool.clone()));
        let notification_repo = Arc::new(SqliteNotificationRepository::new(pool.clone()));
        let quote_repo = Arc::new(SqliteQuoteRepository::new(pool.clone()));
        let quote_notification_repo =
            Arc::new(SqliteQuoteNotificationRepository::new(pool.clone()));
        let material_repo = Arc::new(SqliteMaterialPriceRepository::new(pool.clone()));

        let cascade = Arc::new(CascadeDeleteService::new(pool, object_store.clone()));

        let file_service = Arc::new(FileServiceImpl::new(
            file_repo,
            object_store,
            cascade.clone(),
        ));
        let notification_service = Arc::new(NotificationServiceImpl::new(notification_repo));
        let quote_service = Arc::new(QuoteServiceImpl::new(
            quote_repo,
            quote_notification_repo,
            cascade,
        ));
        let pricing_service = Arc::new(PricingServiceImpl::new(material_repo));
        let rate_cache = Arc::new(MaterialRateCache::new(&pricing_config));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let auth_layer_state = Arc::new(AuthLayerState {
            jwt_utils: jwt_utils.clone(),
        });
        let auth_state = Arc::new(AuthState {
            users: auth_users,
            jwt_utils,
        });

        let router = Router::new()
            .merge(auth_router(auth_state))
            .merge(file_router(file_service, auth_layer_state.clone()))
            .merge(notification_router(
                notification_service,
                auth_layer_state.clone(),
            ))
            .merge(quote_router(quote_service, auth_layer_state.clone()))
            .merge(pricing_router(pricing_service, auth_layer_state))
            .merge(live_rates_router(rate_cache))
            .route("/health", get(|| async { "OK" }));

        App { config, router }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }
}
