use crate::cli::ServeArgs;
use crate::infra::{build_states, AppState};
use crate::routes::with_app_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use stafflink::config::AppConfig;
use stafflink::error::AppError;
use stafflink::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let (recruitment_state, auth_state) = build_states(&config);

    let app = with_app_routes(recruitment_state, auth_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruitment intake backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
