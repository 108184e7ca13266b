//! Service layer module.
//!
//! The connector facade over the pipeline and the lifecycle handle of the
//! embedded HTTP service.

pub mod connector;
pub mod handle;

pub use connector::Connector;
pub use handle::{ServiceHandle, ServiceState};
