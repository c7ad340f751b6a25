//! # MICA Common Library
//!
//! Shared code for MICA services including:
//! - Configuration loading and data folder resolution
//! - Common error types
//! - Content-addressed cache keys
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod hash;
pub mod time;

pub use error::{Error, Result};
