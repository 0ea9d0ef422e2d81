use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use stafflink::auth::{AuthState, Authenticator};
use stafflink::config::AppConfig;
use stafflink::integrations::smart::SmartBatchWriter;
use stafflink::integrations::storage::storage_from_config;
use stafflink::recruitment::{MemoryStore, RecruitmentState};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the store, the configured storage backend, and the IAM proxy into
/// the router states.
pub(crate) fn build_states(config: &AppConfig) -> (RecruitmentState<MemoryStore>, AuthState) {
    let store = Arc::new(MemoryStore::default());
    let storage: Arc<dyn stafflink::integrations::storage::StorageBackend> =
        Arc::from(storage_from_config(&config.storage));
    let writer = SmartBatchWriter::new(config.export.output_dir.clone());
    let authenticator = Arc::new(Authenticator::new(&config.iam, &config.auth));

    let recruitment = RecruitmentState::new(
        store,
        storage,
        config.uploads.clone(),
        writer,
        authenticator.clone(),
    );
    let auth = AuthState {
        authenticator,
        auth: config.auth.clone(),
        iam: config.iam.clone(),
    };
    (recruitment, auth)
}
