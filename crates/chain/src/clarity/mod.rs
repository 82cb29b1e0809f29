//! Clarity values and their wire encoding.
//!
//! Read-only calls take arguments and return results in the Clarity
//! consensus serialization, hex encoded. Principals are written as c32check
//! Stacks addresses.

pub mod c32;
mod codec;
mod value;

pub use value::{ClarityValue, MAX_CONTRACT_NAME_LEN, Principal};

/// Errors raised while encoding or decoding Clarity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Bytes remain after a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    /// Unknown type prefix.
    #[error("unknown type prefix 0x{0:02x}")]
    UnknownType(u8),
    /// Nesting deeper than the VM allows.
    #[error("value nesting too deep")]
    TooDeep,
    /// A length does not fit its prefix.
    #[error("length {0} out of range")]
    TooLong(usize),
    /// String content does not match its declared encoding.
    #[error("invalid string content")]
    InvalidString,
    /// Malformed Stacks address or principal.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// c32check checksum mismatch.
    #[error("checksum mismatch for address {0}")]
    Checksum(String),
    /// Value has a different Clarity type than expected.
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    /// Tuple lacks a required field.
    #[error("missing tuple field `{0}`")]
    MissingField(String),
}
