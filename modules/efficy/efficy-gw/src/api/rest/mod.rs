//! HTTP surface of the Efficy module.

pub mod caller;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use caller::AuthenticatedUser;
pub use routes::router;
pub use state::RestState;
