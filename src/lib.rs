//! OPAC task tracker client.
//!
//! The library holds everything that does not draw to the terminal: the
//! transport adapter, the typed REST facade, the domain models, the
//! collection view engine, the field-diff synchronizer, the board
//! controllers and the worker that drives them. The `opac-tui` binary adds
//! the ratatui front end.

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;
pub mod transport;
pub mod view;
pub mod worker;

pub use api::ApiClient;
pub use error::{ApiError, ApiResult};
pub use sync::Synchronizer;
