//! # Observability
//!
//! Structured logging for the route services and the command line tool.

pub mod logging;

pub use logging::{init_logging, LogFormat};
