use async_trait::async_trait;

use crate::events::{CompanyEvent, Listener};

/// Emits events as `tracing` events. Requires the `tracing` feature.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &CompanyEvent) {
        tracing::info!(
            target: "companies::events",
            event_name = event.name(),
            company_id = event.company_id(),
            ?event,
            "company event"
        );
    }
}
