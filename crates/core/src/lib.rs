//! Core business logic for fitlog.
//!
//! Services take the caller's user ID as an explicit argument and talk to the
//! record store only through `fitlog_db` repositories.

pub mod services;

pub use services::*;
