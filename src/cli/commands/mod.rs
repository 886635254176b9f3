pub mod agents;
pub mod auth;
pub mod compliance;
pub mod contracts;
pub mod dashboard;
pub mod obligations;
pub mod route;
