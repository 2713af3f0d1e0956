//! Binary triplet frame header and element type tags
//!
//! A frame carries one block of a compressed triplet stream so it can be
//! pushed through a fixed-capacity transport buffer.

use crate::format::constants::frame;
use crate::SparseError;

/// Fixed 16-byte header preceding every triplet frame payload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameHeader {
    /// Magic bytes: "DASM"
    pub magic: [u8; 4],
    /// Format version
    pub version: u8,
    /// Element type tag (see `DataType`)
    pub data_type: u8,
    /// Byte order of the payload (0 = little, 1 = big)
    pub byte_order: u8,
    /// Reserved, always zero
    pub reserved: u8,
    /// Number of triplets in the payload, padding included
    pub triplet_count: u64,
}

impl FrameHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = frame::HEADER_SIZE;

    /// Create a header for a payload of `triplet_count` triplets on this host
    pub const fn new(data_type: DataType, triplet_count: u64) -> Self {
        Self {
            magic: frame::MAGIC,
            version: frame::VERSION,
            data_type: data_type.to_u8(),
            byte_order: native_byte_order(),
            reserved: 0,
            triplet_count,
        }
    }

    /// Validate magic and version
    pub fn is_valid(&self) -> bool {
        self.magic == frame::MAGIC && self.version <= frame::VERSION
    }

    /// Decoded element type, if the tag is known
    pub const fn element_type(&self) -> Option<DataType> {
        DataType::from_u8(self.data_type)
    }

    /// Parse header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SparseError> {
        if bytes.len() < Self::SIZE {
            return Err(SparseError::InvalidFrame("header truncated"));
        }

        if bytes[0..4] != frame::MAGIC {
            return Err(SparseError::InvalidFrame("bad magic bytes"));
        }

        let version = bytes[4];
        if version > frame::VERSION {
            return Err(SparseError::InvalidFrame("unsupported frame version"));
        }

        let byte_order = bytes[6];
        if byte_order != frame::LITTLE_ENDIAN && byte_order != frame::BIG_ENDIAN {
            return Err(SparseError::InvalidFrame("unknown byte order"));
        }

        let triplet_count = u64::from_le_bytes([
            bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
        ]);

        Ok(Self {
            magic: frame::MAGIC,
            version,
            data_type: bytes[5],
            byte_order,
            reserved: 0,
            triplet_count,
        })
    }

    /// Convert header to bytes array
    pub const fn to_bytes_array(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];

        bytes[0] = self.magic[0];
        bytes[1] = self.magic[1];
        bytes[2] = self.magic[2];
        bytes[3] = self.magic[3];
        bytes[4] = self.version;
        bytes[5] = self.data_type;
        bytes[6] = self.byte_order;
        bytes[7] = self.reserved;

        let count = self.triplet_count.to_le_bytes();
        let mut k = 0;
        while k < 8 {
            bytes[8 + k] = count[k];
            k += 1;
        }

        bytes
    }
}

/// Byte order tag of the running host
pub const fn native_byte_order() -> u8 {
    if cfg!(target_endian = "big") {
        frame::BIG_ENDIAN
    } else {
        frame::LITTLE_ENDIAN
    }
}

/// Element types that can travel in a triplet frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    /// 32-bit floating point
    F32 = 0,
    /// 64-bit floating point
    F64 = 1,
    /// 32-bit signed integer
    I32 = 2,
    /// 64-bit signed integer
    I64 = 3,
    /// 32-bit unsigned integer
    U32 = 4,
    /// 64-bit unsigned integer
    U64 = 5,
}

impl DataType {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataType::F32),
            1 => Some(DataType::F64),
            2 => Some(DataType::I32),
            3 => Some(DataType::I64),
            4 => Some(DataType::U32),
            5 => Some(DataType::U64),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the size in bytes for this data type
    pub const fn size_bytes(self) -> usize {
        match self {
            DataType::F32 | DataType::I32 | DataType::U32 => 4,
            DataType::F64 | DataType::I64 | DataType::U64 => 8,
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataType::F32 => write!(f, "f32"),
            DataType::F64 => write!(f, "f64"),
            DataType::I32 => write!(f, "i32"),
            DataType::I64 => write!(f, "i64"),
            DataType::U32 => write!(f, "u32"),
            DataType::U64 => write!(f, "u64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes_round_trip() {
        let header = FrameHeader::new(DataType::F64, 42);
        let bytes = header.to_bytes_array();
        assert_eq!(&bytes[0..4], b"DASM");
        assert_eq!(FrameHeader::from_bytes(&bytes), Ok(header));
        assert_eq!(header.element_type(), Some(DataType::F64));
    }

    #[test]
    fn test_header_rejects_garbage() {
        assert_eq!(
            FrameHeader::from_bytes(&[0u8; 8]),
            Err(SparseError::InvalidFrame("header truncated"))
        );

        let mut bytes = FrameHeader::new(DataType::I32, 1).to_bytes_array();
        bytes[0] = b'X';
        assert_eq!(
            FrameHeader::from_bytes(&bytes),
            Err(SparseError::InvalidFrame("bad magic bytes"))
        );

        let mut bytes = FrameHeader::new(DataType::I32, 1).to_bytes_array();
        bytes[4] = frame::VERSION + 1;
        assert_eq!(
            FrameHeader::from_bytes(&bytes),
            Err(SparseError::InvalidFrame("unsupported frame version"))
        );
    }

    #[test]
    fn test_unknown_data_type() {
        let mut header = FrameHeader::new(DataType::U64, 0);
        header.data_type = 9;
        assert_eq!(header.element_type(), None);
        assert_eq!(DataType::from_u8(3), Some(DataType::I64));
        assert_eq!(DataType::F32.size_bytes(), 4);
    }
}
