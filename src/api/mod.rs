//! HTTP surface for the company and account actions.

mod types;

pub use types::*;

pub mod axum;
