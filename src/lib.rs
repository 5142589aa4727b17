//! Picking stream library
//!
//! Reads newline-delimited picking events within a count and time budget,
//! drops excluded temperature zones, and reports picks grouped per picker.
//! Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod error;
pub mod infra;
pub mod io;
pub mod services;

pub use error::{ProcessError, Result};
