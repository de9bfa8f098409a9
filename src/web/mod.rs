//! Web server module
//!
//! Exposes the search gateway over HTTP as JSON.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
