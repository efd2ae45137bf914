//! Database module
//!
//! This module handles database connections, schema bootstrap, and
//! repositories.

pub mod connection;
pub mod repositories;

pub use connection::*;
