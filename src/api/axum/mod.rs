mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{AuthenticatedUser, extract_bearer_token};
pub use routes::{CompaniesState, account_routes, company_routes, routes};
