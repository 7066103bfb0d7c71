//! `SQLite` implementations of every repository trait.
//!
//! Enable the `sqlx_sqlite` feature to use these. Run [`migrations::run`]
//! once at startup.

mod api_token;
mod companies;
pub mod migrations;
mod user;

pub use api_token::SqliteApiTokenRepository;
pub use companies::{
    SqliteCompanyInvitationRepository, SqliteCompanyMembershipRepository,
    SqliteCompanyRepository, SqliteCurrentCompanyRepository,
};
use sqlx::SqlitePool;
pub use user::SqliteUserRepository;

use crate::CompanyError;

/// Every `SQLite` repository, sharing one pool.
#[derive(Clone)]
pub struct SqliteRepositories {
    pub users: SqliteUserRepository,
    pub api_tokens: SqliteApiTokenRepository,
    pub companies: SqliteCompanyRepository,
    pub memberships: SqliteCompanyMembershipRepository,
    pub invitations: SqliteCompanyInvitationRepository,
    pub current: SqliteCurrentCompanyRepository,
}

pub fn create_repositories(pool: SqlitePool) -> SqliteRepositories {
    SqliteRepositories {
        users: SqliteUserRepository::new(pool.clone()),
        api_tokens: SqliteApiTokenRepository::new(pool.clone()),
        companies: SqliteCompanyRepository::new(pool.clone()),
        memberships: SqliteCompanyMembershipRepository::new(pool.clone()),
        invitations: SqliteCompanyInvitationRepository::new(pool.clone()),
        current: SqliteCurrentCompanyRepository::new(pool),
    }
}

/// Logs a failed query and maps it to [`CompanyError::DatabaseError`].
fn db_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> CompanyError {
    move |e| {
        log::error!(
            target: "companies",
            "msg=\"database error\", operation=\"{operation}\", error=\"{e}\""
        );
        CompanyError::DatabaseError(e.to_string())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
