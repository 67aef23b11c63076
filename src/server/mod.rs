//! Query adapters
//!
//! The `extract` chat command and the HTTP extract endpoint, both thin
//! front-ends over [`QueryEngine`](crate::query::QueryEngine).

pub mod command;
pub mod http;

pub use command::{command_spec, extract_url, CommandHandler, Reply};
pub use http::{create_router, run_http_server, HttpState};
