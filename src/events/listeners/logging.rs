use async_trait::async_trait;

use crate::events::{CompanyEvent, Listener};

/// Logs every event through the `log` facade.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    /// Logs at INFO.
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &CompanyEvent) {
        match event.company_id() {
            Some(company_id) => log::log!(
                target: "companies::events",
                self.level,
                "event={} company_id={company_id} {:?}",
                event.name(),
                event
            ),
            None => log::log!(
                target: "companies::events",
                self.level,
                "event={} {:?}",
                event.name(),
                event
            ),
        }
    }
}
