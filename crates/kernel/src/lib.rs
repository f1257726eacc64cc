//! Quire Kernel Library
//!
//! Schema-driven content API: content types, content entries, a single
//! operator account, and bearer-token sessions behind one operation
//! dispatcher. The `quire` binary serves it over HTTP.

pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod shutdown;
pub mod state;
pub mod store;

pub use config::Config;
pub use dispatcher::{Dispatcher, Operation, OperationResult, RequestContext};
pub use error::{AppError, AppResult};
pub use session::{Clock, Session, SessionStore, SystemClock};
pub use state::AppState;
