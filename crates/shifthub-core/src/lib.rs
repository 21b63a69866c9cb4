//! # shifthub-core
//!
//! Core crate for ShiftHub. Contains configuration schemas, domain
//! primitive types (shift names, session keys, actors), and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other ShiftHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
