//! Validation utilities for dual-access sparse matrices
//!
//! Pure functions with no I/O: index bounds, triplet streams, and
//! record tokenizing.

pub mod bounds;
pub mod parsing;
pub mod triplets;

pub use bounds::{check_index, check_same_shape, BoundsCheck};
pub use parsing::{parse_bool, parse_usize, Token, Tokenizer};
pub use triplets::{chunk_len, decode_index, encode_index, validate_triplet_len};
