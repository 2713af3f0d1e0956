//! Matrix element type constraints
//!
//! This module defines the trait that constrains what types can be
//! stored in a dual-access sparse matrix.

use core::fmt::{Debug, Display};
use core::ops::Add;
use core::str::FromStr;

use crate::format::DataType;

/// Trait for types that can be stored as matrix elements
///
/// Elements must be plain old data (so triplet streams can be cast to
/// bytes), comparable against the null element, summable, and printable
/// and parseable for textual records.
///
/// The compressed triplet format stores row and column indices in the
/// element type itself, so every element type also defines how an index
/// is encoded exactly.
pub trait MatrixElement:
    bytemuck::Pod + PartialEq + Add<Output = Self> + Debug + Display + FromStr
{
    /// Get the DataType tag for this element type
    fn data_type() -> DataType;

    /// Get the size in bytes of this element type
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Additive identity, the default null element
    fn zero() -> Self;

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self;

    /// Convert to f64 for generic operations
    fn to_f64(self) -> f64;

    /// Encode an index exactly, or `None` if the type cannot represent it
    fn from_index(index: usize) -> Option<Self>;

    /// Decode an index; `None` unless the value is a non-negative integer
    /// that fits in `usize`
    fn to_index(self) -> Option<usize>;
}

macro_rules! impl_float_element {
    ($ty:ty, $tag:expr, $exact:expr) => {
        impl MatrixElement for $ty {
            fn data_type() -> DataType {
                $tag
            }

            fn zero() -> Self {
                0.0
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_index(index: usize) -> Option<Self> {
                // Integers above the mantissa range lose precision.
                if index as u64 <= $exact {
                    Some(index as $ty)
                } else {
                    None
                }
            }

            fn to_index(self) -> Option<usize> {
                if !(self >= 0.0 && self <= $exact as $ty) {
                    return None;
                }
                let truncated = self as u64;
                if truncated as $ty != self {
                    return None;
                }
                usize::try_from(truncated).ok()
            }
        }
    };
}

macro_rules! impl_int_element {
    ($ty:ty, $tag:expr) => {
        impl MatrixElement for $ty {
            fn data_type() -> DataType {
                $tag
            }

            fn zero() -> Self {
                0
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_index(index: usize) -> Option<Self> {
                <$ty>::try_from(index).ok()
            }

            fn to_index(self) -> Option<usize> {
                usize::try_from(self).ok()
            }
        }
    };
}

impl_float_element!(f32, DataType::F32, 1u64 << f32::MANTISSA_DIGITS);
impl_float_element!(f64, DataType::F64, 1u64 << f64::MANTISSA_DIGITS);
impl_int_element!(i32, DataType::I32);
impl_int_element!(i64, DataType::I64);
impl_int_element!(u32, DataType::U32);
impl_int_element!(u64, DataType::U64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_indices() {
        assert_eq!(f64::from_index(7), Some(7.0));
        assert_eq!(7.0f64.to_index(), Some(7));
        assert_eq!((-1.0f64).to_index(), None);
        assert_eq!(2.5f64.to_index(), None);
        assert_eq!(f64::NAN.to_index(), None);
        assert_eq!(f64::INFINITY.to_index(), None);

        assert_eq!(f32::from_index(1 << 24), Some(16_777_216.0));
        assert_eq!(f32::from_index((1 << 24) + 1), None);
    }

    #[test]
    fn test_int_indices() {
        assert_eq!(i32::from_index(12), Some(12));
        assert_eq!((-3i32).to_index(), None);
        assert_eq!(u32::from_index(u32::MAX as usize), Some(u32::MAX));
        assert_eq!(i32::from_index(i32::MAX as usize + 1), None);
        assert_eq!(5u64.to_index(), Some(5));
    }

    #[test]
    fn test_zero_and_tags() {
        assert_eq!(i64::zero(), 0);
        assert_eq!(f32::zero(), 0.0);
        assert_eq!(<f64 as MatrixElement>::data_type(), DataType::F64);
        assert_eq!(<i32 as MatrixElement>::size_bytes(), 4);
    }
}
