pub mod auth;
pub mod backend;
pub mod forms;
pub mod session;

pub use backend::{BackendClient, BackendError, HttpBackendClient, MockBackend, OAuth2Provider};
pub use session::{Session, SessionStore};
