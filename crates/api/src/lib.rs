//! HTTP services for the shop.
//!
//! One binary hosts the catalog (products, categories, stock ledger), the
//! shop (users, carts, orders) or both, depending on
//! [`ServiceRole`](config::ServiceRole). When the shop runs without a local
//! catalog, product lookups and stock calls go over HTTP through
//! [`CatalogClient`](remote::CatalogClient).

pub mod config;
pub mod error;
pub mod remote;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use catalog::{CatalogService, InMemoryCatalog, PRODUCT_FIELDS, StockLedger};
use domain::{CartService, ORDER_FIELDS, ProductLookup, USER_FIELDS, UserDirectory};
use journal::InMemoryJournal;
use metrics_exporter_prometheus::PrometheusHandle;
use ordering::OrderingError;
use saga::{LocalStockService, OrderSagaCoordinator, Reconciler, SagaConfig, StockService};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{Config, ConfigError, ServiceRole};
use remote::{CatalogClient, RemoteConfig, RemoteError};

pub type SharedLookup = Arc<dyn ProductLookup>;
pub type SharedStock = Arc<dyn StockService>;
pub type ShopSaga = OrderSagaCoordinator<InMemoryJournal, SharedLookup, SharedStock>;
pub type ShopReconciler = Reconciler<InMemoryJournal, SharedLookup, SharedStock>;

/// State behind the catalog routes.
pub struct CatalogState {
    pub catalog: CatalogService,
    pub ledger: StockLedger,
}

impl CatalogState {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self {
            ledger: StockLedger::new(catalog.clone()),
            catalog: CatalogService::new(catalog),
        }
    }
}

/// State behind the shop routes.
pub struct ShopState {
    pub users: UserDirectory,
    pub carts: CartService<SharedLookup>,
    pub saga: ShopSaga,
    pub reconciler: ShopReconciler,
}

impl ShopState {
    pub fn new(lookup: SharedLookup, stock: SharedStock, saga_config: SagaConfig) -> Self {
        let journal = InMemoryJournal::new();
        let carts = CartService::new(lookup);
        let saga = OrderSagaCoordinator::new(
            journal.clone(),
            carts.clone(),
            Arc::clone(&stock),
            saga_config,
        );
        let reconciler = Reconciler::new(journal, carts.clone(), stock, saga_config);
        Self {
            users: UserDirectory::new(),
            carts,
            saga,
            reconciler,
        }
    }
}

/// The services one process hosts.
#[derive(Clone, Default)]
pub struct Services {
    pub catalog: Option<Arc<CatalogState>>,
    pub shop: Option<Arc<ShopState>>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    FieldTable(#[from] OrderingError),
}

impl Services {
    /// Catalog and shop in one process; stock calls stay in memory.
    pub fn standalone(catalog: InMemoryCatalog, saga_config: SagaConfig) -> Self {
        let stock = LocalStockService::new(StockLedger::new(catalog.clone()));
        let shop = ShopState::new(Arc::new(catalog.clone()), Arc::new(stock), saga_config);
        Self {
            catalog: Some(Arc::new(CatalogState::new(catalog))),
            shop: Some(Arc::new(shop)),
        }
    }

    pub fn catalog_only(catalog: InMemoryCatalog) -> Self {
        Self {
            catalog: Some(Arc::new(CatalogState::new(catalog))),
            shop: None,
        }
    }

    /// Shop routes backed by a catalog in another process.
    pub fn remote_shop(client: CatalogClient, saga_config: SagaConfig) -> Self {
        let client = Arc::new(client);
        let shop = ShopState::new(client.clone(), client, saga_config);
        Self {
            catalog: None,
            shop: Some(Arc::new(shop)),
        }
    }

    /// Builds the services for the configured role, seeding demo data when asked.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        validate_field_tables()?;
        let saga_config = config.saga();

        let local_catalog = || async {
            let store = InMemoryCatalog::new();
            if config.seed_demo_data {
                catalog::seed_demo(&store).await;
            }
            store
        };

        let services = match config.role {
            ServiceRole::Standalone => Self::standalone(local_catalog().await, saga_config),
            ServiceRole::Catalog => Self::catalog_only(local_catalog().await),
            ServiceRole::Shop => {
                let base_url = config
                    .catalog_url
                    .clone()
                    .ok_or(ConfigError::MissingCatalogUrl)?;
                let client = CatalogClient::new(&RemoteConfig {
                    base_url,
                    timeout: config.stock_timeout,
                })?;
                Self::remote_shop(client, saga_config)
            }
        };
        Ok(services)
    }

    fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.catalog.is_some() {
            names.push("catalog");
        }
        if self.shop.is_some() {
            names.push("shop");
        }
        names
    }
}

/// Runs a reconciliation pass over the shop's checkouts every `every`.
///
/// The task lives until it is aborted or the runtime shuts down.
pub fn spawn_reconciliation(shop: Arc<ShopState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = every.as_secs_f64(), "reconciliation task started");
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match shop.reconciler.reconcile_faulted().await {
                Ok(report) if report.settled() > 0 || !report.pending.is_empty() => {
                    tracing::info!(
                        settled = report.settled(),
                        pending = report.pending.len(),
                        "reconciliation pass"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "reconciliation pass failed"),
            }
        }
    })
}

/// Checks every sortable field table once at startup.
pub fn validate_field_tables() -> Result<(), OrderingError> {
    PRODUCT_FIELDS.validate()?;
    ORDER_FIELDS.validate()?;
    USER_FIELDS.validate()?;
    Ok(())
}

/// Creates the Axum application router for the hosted services.
pub fn create_app(services: Services, metrics_handle: PrometheusHandle) -> Router {
    let health_router = Router::new()
        .route("/health", get(routes::health::check))
        .with_state(Arc::new(services.names()));

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let mut app = health_router.merge(metrics_router);
    if let Some(catalog) = services.catalog {
        app = app.merge(routes::catalog_router(catalog));
    }
    if let Some(shop) = services.shop {
        app = app.merge(routes::shop_router(shop));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
}
