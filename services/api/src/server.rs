use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCompanyRepository, InMemoryMemberDirectory};
use crate::routes::with_catalog_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement_tracker::config::AppConfig;
use placement_tracker::error::AppError;
use placement_tracker::import::CompanyImporter;
use placement_tracker::placement::catalog::PlacementCatalog;
use placement_tracker::placement::DashboardLimits;
use placement_tracker::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let companies = match &config.dashboard.seed_csv {
        Some(path) => InMemoryCompanyRepository::with_companies(CompanyImporter::from_path(path)?),
        None => InMemoryCompanyRepository::default(),
    };
    let members = match &config.access.bootstrap_admin {
        Some(user_id) => InMemoryMemberDirectory::with_admin(user_id),
        None => {
            warn!("PLACEMENT_BOOTSTRAP_ADMIN unset; admin endpoints will reject every caller");
            InMemoryMemberDirectory::default()
        }
    };
    let catalog = Arc::new(PlacementCatalog::new(Arc::new(companies), Arc::new(members)));
    let limits = DashboardLimits::from(&config.dashboard);

    let app = with_catalog_routes(catalog, limits)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, list_limit = limits.upcoming, "placement tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
