//! Domain operations of the platform API.
//!
//! Each operation is a thin [`Gateway::request`](crate::gateway::Gateway::request)
//! call; payloads are forwarded as decoded JSON without schema interpretation.

pub mod agents;
pub mod compliance;
pub mod contracts;
pub mod dashboard;
pub mod obligations;

pub use compliance::AuditLogQuery;
pub use contracts::ContractQuery;
