pub mod core;
pub mod dashboards;
pub mod modals;
pub mod schemas;
pub mod sections;
pub mod services;
pub mod store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, telemetry};
use crate::services::gateway::HttpGateway;
use crate::services::session::{monitor_session, SessionCheck, SessionProvider, StaticSession};
use crate::store::AdminStore;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let session = Arc::new(StaticSession::from_settings(settings.identity()));
    let gateway = HttpGateway::from_settings(&settings, session.clone())?;

    match gateway.check_health().await {
        Ok(health) => tracing::info!(
            base_url = gateway.base_url(),
            status = %health.status,
            "Backend reachable"
        ),
        Err(err) => tracing::warn!(
            base_url = gateway.base_url(),
            error = %err,
            "Backend health check failed; continuing"
        ),
    }

    let store = AdminStore::new(Arc::new(gateway));
    let report = store.mount().await;

    for card in store.snapshot().stats.cards() {
        tracing::info!(title = card.title, value = card.value, change = card.change, "Overview");
    }
    for (kind, outcome) in report.outcomes() {
        match outcome {
            Ok(count) => tracing::info!(resource = kind.as_str(), count, "Loaded"),
            Err(err) => tracing::warn!(resource = kind.as_str(), error = %err, "Load failed"),
        }
    }

    tracing::info!(
        environment = settings.runtime().environment.as_str(),
        check_interval_seconds = settings.session().check_interval_seconds,
        "Admin dashboard data loaded; watching session"
    );

    let provider: &dyn SessionProvider = session.as_ref();
    let last = monitor_session(
        provider,
        settings.session().check_interval(),
        settings.session().expiry_warning(),
        core::shutdown::shutdown_signal(),
    )
    .await;

    if last == SessionCheck::Expired {
        tracing::warn!(login_url = %settings.ui().login_url, "Session expired. Please log in again.");
    }
    tracing::info!("Shutting down");

    Ok(())
}
