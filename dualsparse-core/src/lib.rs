#![no_std]

//! Dualsparse Core - Dual-Access Sparse Matrix Definitions
//!
//! This crate provides the error model, element and access traits, access
//! modes, and the pure validation and parsing helpers shared by the
//! `dualsparse` containers. It performs no I/O.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod format;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::*;
