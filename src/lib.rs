pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod routes;
pub mod session;
pub mod store;

pub use error::{ErrorClass, GatewayError};
pub use gateway::{FilePayload, Gateway, LoginOutcome, OutboundRequest, PendingUpload, UploadProgress};
pub use navigation::{Navigation, Navigator};
pub use routes::{Admission, Route, RouteGate};
pub use session::{Identity, Session, SessionContext, Subscription};
pub use store::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError};
