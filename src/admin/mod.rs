//! Admin Module
//!
//! Read-only monitoring endpoints: system health, performance, database,
//! security events, logs and disk usage.

mod api;
mod response;

pub use api::{AdminApi, AdminConfig};
pub use response::{AdminRequest, AdminResponse, Envelope};
