use async_trait::async_trait;

use super::CompanyEvent;

/// Asynchronous handler for [`CompanyEvent`]s.
///
/// ```rust,ignore
/// use companies::events::{CompanyEvent, Listener};
/// use async_trait::async_trait;
///
/// struct InvitationMailer;
///
/// #[async_trait]
/// impl Listener for InvitationMailer {
///     fn wants(&self, event: &CompanyEvent) -> bool {
///         matches!(event, CompanyEvent::CompanyEmployeeInvited { .. })
///     }
///
///     async fn handle(&self, event: &CompanyEvent) {
///         // queue the invitation e-mail
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Events for which this returns `false` are never handed to
    /// [`handle`](Self::handle). Defaults to every event.
    fn wants(&self, _event: &CompanyEvent) -> bool {
        true
    }

    async fn handle(&self, event: &CompanyEvent);
}

/// Restricts a listener to the events of a single company, such as a
/// per-tenant webhook. Events without a company are skipped.
pub struct CompanyScoped<L> {
    company_id: i64,
    inner: L,
}

impl<L: Listener> CompanyScoped<L> {
    pub fn new(company_id: i64, inner: L) -> Self {
        Self { company_id, inner }
    }
}

#[async_trait]
impl<L: Listener> Listener for CompanyScoped<L> {
    fn wants(&self, event: &CompanyEvent) -> bool {
        event.company_id() == Some(self.company_id) && self.inner.wants(event)
    }

    async fn handle(&self, event: &CompanyEvent) {
        self.inner.handle(event).await;
    }
}
