//! Decode error taxonomy.

use crate::{HEADER_SIZE, PacketType};
use serde::Serialize;
use thiserror::Error;

/// Low-level failure while decoding a packet body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated packet: need {needed} bytes at offset {offset}, {remaining} remaining")]
    TruncatedPacket {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown packet type {0}")]
    UnknownPacketType(u8),

    #[error("unsupported packet format {0}")]
    UnsupportedFormatVersion(u16),

    #[error("{field} count {count} exceeds capacity {capacity}")]
    CountOutOfRange {
        field: &'static str,
        count: usize,
        capacity: usize,
    },
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TruncatedPacket { .. } => ErrorKind::TruncatedPacket,
            Self::UnknownPacketType(_) => ErrorKind::UnknownPacketType,
            Self::UnsupportedFormatVersion(_) => ErrorKind::UnsupportedFormatVersion,
            Self::CountOutOfRange { .. } => ErrorKind::CountOutOfRange,
        }
    }

    /// Reject a count field that claims more entries than the fixed array holds.
    pub(crate) fn check_count(
        field: &'static str,
        count: u8,
        capacity: usize,
    ) -> Result<usize, DecodeError> {
        let count = usize::from(count);
        if count > capacity {
            return Err(Self::CountOutOfRange {
                field,
                count,
                capacity,
            });
        }
        Ok(count)
    }
}

/// Failure to decode the common 29-byte header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderDecodeError {
    #[error("datagram too short for header: {len} bytes (need {need})", need = HEADER_SIZE)]
    TooShort { len: usize },

    #[error("unknown packet type {0}")]
    UnknownPacketType(u8),
}

impl HeaderDecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TooShort { .. } => ErrorKind::TruncatedPacket,
            Self::UnknownPacketType(_) => ErrorKind::UnknownPacketType,
        }
    }
}

/// Failure to decode the body of a packet whose header was valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{packet_type} packet: {reason}")]
pub struct PacketDecodeError {
    pub packet_type: PacketType,
    #[source]
    pub reason: DecodeError,
}

/// Any failure turning one datagram into a [`crate::DecodedPacket`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatagramError {
    #[error(transparent)]
    Header(#[from] HeaderDecodeError),

    #[error(transparent)]
    Packet(#[from] PacketDecodeError),
}

impl DatagramError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Header(err) => err.kind(),
            Self::Packet(err) => err.reason.kind(),
        }
    }

    /// Packet type of the failed datagram, when the header got that far.
    pub fn packet_type(&self) -> Option<PacketType> {
        match self {
            Self::Header(_) => None,
            Self::Packet(err) => Some(err.packet_type),
        }
    }
}

/// Stable label for counting and logging decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TruncatedPacket,
    UnknownPacketType,
    UnsupportedFormatVersion,
    CountOutOfRange,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TruncatedPacket => "truncated_packet",
            Self::UnknownPacketType => "unknown_packet_type",
            Self::UnsupportedFormatVersion => "unsupported_format_version",
            Self::CountOutOfRange => "count_out_of_range",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeaderDecodeError::TooShort { len: 10 };
        assert_eq!(
            err.to_string(),
            "datagram too short for header: 10 bytes (need 29)"
        );

        let err = PacketDecodeError {
            packet_type: PacketType::CarDamage,
            reason: DecodeError::UnsupportedFormatVersion(2023),
        };
        assert_eq!(
            err.to_string(),
            "CarDamage packet: unsupported packet format 2023"
        );
    }

    #[test]
    fn test_kinds_are_stable() {
        let err = DatagramError::from(HeaderDecodeError::TooShort { len: 0 });
        assert_eq!(err.kind(), ErrorKind::TruncatedPacket);
        assert_eq!(err.packet_type(), None);

        let err = DatagramError::from(PacketDecodeError {
            packet_type: PacketType::Session,
            reason: DecodeError::CountOutOfRange {
                field: "numMarshalZones",
                count: 30,
                capacity: 21,
            },
        });
        assert_eq!(err.kind().as_str(), "count_out_of_range");
        assert_eq!(err.packet_type(), Some(PacketType::Session));
    }

    #[test]
    fn test_check_count() {
        assert_eq!(DecodeError::check_count("n", 21, 21), Ok(21));
        assert!(matches!(
            DecodeError::check_count("n", 22, 21),
            Err(DecodeError::CountOutOfRange { count: 22, .. })
        ));
    }
}
