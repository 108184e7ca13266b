//! HTTP API.
//!
//! An axum router over the [`Connector`](crate::service::Connector), with
//! the error mapping and the DTOs existing clients expect.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerConfig, AppState};
