use std::sync::OnceLock;

use super::{CompanyEvent, CompanyScoped, Listener};

static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();

/// Listeners registered once at startup through [`register_event_listeners`].
pub struct EventRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl EventRegistry {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Listeners are called in the order they are registered.
    pub fn listen(&mut self, listener: impl Listener) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Registers `listener` for the events of `company_id` only.
    pub fn listen_to_company(&mut self, company_id: i64, listener: impl Listener) -> &mut Self {
        self.listen(CompanyScoped::new(company_id, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns how many listeners handled the event.
    async fn dispatch(&self, event: &CompanyEvent) -> usize {
        let mut handled = 0;
        for listener in self.listeners.iter().filter(|l| l.wants(event)) {
            listener.handle(event).await;
            handled += 1;
        }

        log::debug!(
            target: "companies::events",
            "msg=\"event dispatched\", event={}, company_id={:?}, listeners={}",
            event.name(),
            event.company_id(),
            handled
        );

        handled
    }
}

/// Register event listeners at application startup.
///
/// Only the first call takes effect; later calls log a warning.
///
/// ```rust,ignore
/// use companies::register_event_listeners;
/// use companies::events::listeners::LoggingListener;
///
/// register_event_listeners(|registry| {
///     registry
///         .listen(LoggingListener::new())
///         .listen_to_company(42, AcmeWebhook::new());
/// });
/// ```
pub fn register_event_listeners<F>(f: F)
where
    F: FnOnce(&mut EventRegistry),
{
    let mut registry = EventRegistry::new();
    f(&mut registry);
    let count = registry.len();
    if REGISTRY.set(registry).is_err() {
        log::warn!(
            target: "companies",
            "register_event_listeners called more than once, ignoring"
        );
        return;
    }

    log::info!(
        target: "companies",
        "msg=\"event listeners registered\", listeners={count}"
    );
}

/// Dispatch an event to all registered listeners. No-op without listeners.
pub async fn dispatch(event: CompanyEvent) {
    if let Some(registry) = REGISTRY.get() {
        registry.dispatch(&event).await;
    }
}
