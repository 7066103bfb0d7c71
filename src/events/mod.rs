//! Domain events fired by every mutating action.
//!
//! Hosts hook into these to send invitation e-mails or write audit trails.
//! Listeners can be scoped to one company with
//! [`EventRegistry::listen_to_company`]. Without registered listeners
//! dispatch is a no-op.
//!
//! ```rust,ignore
//! use companies::register_event_listeners;
//! use companies::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::CompanyEvent;
pub use listener::{CompanyScoped, Listener};
pub use registry::{EventRegistry, dispatch, register_event_listeners};
