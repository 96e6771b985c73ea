//! HTTP exposure of the snippet service.
//!
//! Two route families expose the same operations: the plain family renders
//! identifier-keyed output, the `/linked` family renders hyperlinked output.
//! Both are thin adapters that translate verb and path into the one
//! canonical dispatch call; neither re-implements authorization, validation
//! or rendering.
//!
//! # Usage
//!
//! ```rust,ignore
//! use snipbin::api;
//!
//! let app = Router::new()
//!     .merge(api::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;

pub use handler::AppState;
pub use routes::routes;
