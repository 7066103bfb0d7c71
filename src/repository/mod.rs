//! Storage traits for user accounts and API tokens.
//!
//! Company tables have their own traits in [`crate::companies`]. Implement
//! these to plug in a storage backend, or enable `sqlx_sqlite` / `mocks` for
//! the bundled ones.
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`UserRepository`] | User rows and profile updates |
//! | [`ApiTokenRepository`] | Personal API tokens and their abilities |

mod api_token;
mod user;

pub use api_token::{ApiToken, ApiTokenRepository, NewApiToken};
pub use user::{NewUser, User, UserRepository};
