//! Decoders for the EA F1 24/25 UDP telemetry protocol.
//!
//! Every datagram starts with a 29-byte [`PacketHeader`]; the header's packet
//! id selects one of sixteen body layouts and its packet format selects the
//! 2024 or 2025 variant of that layout. All integers and floats are
//! little-endian.
//!
//! Decoding is pure and allocation-light: [`decode_datagram`] turns a byte
//! slice into a [`DecodedPacket`] or a typed [`DatagramError`], and never
//! panics on malformed input.
//!
//! ```
//! use f1_telemetry_wire::builder::{HeaderSpec, zeroed_packet};
//! use f1_telemetry_wire::{PACKET_FORMAT_2025, PacketType, decode_datagram};
//!
//! let raw = zeroed_packet(&HeaderSpec::new(PACKET_FORMAT_2025, PacketType::CarDamage, 7));
//! let packet = decode_datagram(&raw).expect("valid packet");
//! assert_eq!(packet.header.session_uid, 7);
//! assert_eq!(packet.packet_type(), PacketType::CarDamage);
//! ```

#![deny(static_mut_refs)]

pub mod builder;
mod car_array;
mod cursor;
mod error;
mod header;
pub mod packets;

pub use car_array::{CarArray, NUM_CARS};
pub use cursor::ByteReader;
pub use error::{DatagramError, DecodeError, ErrorKind, HeaderDecodeError, PacketDecodeError};
pub use header::{
    CarIndex, HEADER_SIZE, PACKET_FORMAT_2024, PACKET_FORMAT_2025, PacketFormat, PacketHeader,
    PacketType, SECONDARY_PLAYER_ABSENT, decode_header,
};
pub use packets::{DecodedPacket, MAX_DATAGRAM_SIZE, PacketBody, body_size, decode_datagram};
