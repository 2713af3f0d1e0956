//! Format definitions for records and triplet frames
//!
//! Pure data definitions with no I/O.

pub mod constants;
pub mod header;
pub mod mode;

pub use header::{native_byte_order, DataType, FrameHeader};
pub use mode::AccessMode;
