//! Protocol-level error types.

use crate::prelude::*;
use thiserror::Error;

/// Errors that can occur during TDS protocol parsing or encoding.
///
/// Two of these variants are not really "errors" in the usual sense:
/// [`ProtocolError::NotEnoughBytes`] is the flow-control signal a token
/// decoder returns when it needs bytes from the next PDU before it can make
/// progress. Callers that feed the parser one PDU at a time are expected to
/// see this constantly and treat it as "come back with more data", not as a
/// failure to report to the caller's caller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The decoder ran out of buffered bytes partway through a value.
    ///
    /// `needed` is a lower bound on how many additional bytes would let the
    /// decoder retry from the start of the value it was decoding (the
    /// decoder rewinds its position before returning this, so the caller
    /// can simply append more bytes and call it again).
    #[error("not enough bytes buffered to decode: need at least {needed} more")]
    NotEnoughBytes {
        /// Minimum number of additional bytes required to make progress.
        needed: usize,
    },

    /// A length field named a value larger than the configured memory
    /// budget for a single token.
    #[error("token payload of {0} bytes exceeds the configured memory budget")]
    NotEnoughMemory(usize),

    /// Packet data is truncated or incomplete at the framing layer.
    #[error("incomplete packet: expected {expected} bytes, got {actual}")]
    IncompletePacket {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes available.
        actual: usize,
    },

    /// Invalid packet type value.
    #[error("invalid packet type: {0:#04x}")]
    InvalidPacketType(u8),

    /// Invalid packet status flags.
    #[error("invalid packet status: {0:#04x}")]
    InvalidPacketStatus(u8),

    /// Packet length exceeds maximum allowed.
    #[error("packet too large: {length} bytes (max {max})")]
    PacketTooLarge {
        /// Actual packet length.
        length: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Invalid token type value.
    #[error("invalid token type: {0:#04x}")]
    InvalidTokenType(u8),

    /// Invalid data type value.
    #[error("invalid data type: {0:#04x}")]
    InvalidDataType(u8),

    /// A column's reported field length is inconsistent with its type's
    /// size class (for example, a length that is neither the null sentinel
    /// nor representable in the column's declared width).
    #[error("field length {length} is not valid for this column's size class")]
    InvalidFieldLength {
        /// The length value that failed validation.
        length: usize,
    },

    /// A ROW (or NBCROW) token arrived before any COLMETADATA token had
    /// established the shape of the result set.
    #[error("a ROW token arrived with no preceding COLMETADATA")]
    MissingPriorColMetaData,

    /// A column's type carries a size class this implementation does not
    /// know how to decode a length prefix for.
    #[error("column size class has no recognized length-prefix encoding")]
    UnknownColumnSizeType,

    /// Invalid prelogin option.
    #[error("invalid prelogin option: {0:#04x}")]
    InvalidPreloginOption(u8),

    /// Invalid TDS version.
    #[error("invalid TDS version: {0:#010x}")]
    InvalidTdsVersion(u32),

    /// String encoding error.
    #[error("string encoding error: {0}")]
    StringEncoding(String),

    /// A length-prefixed string's bytes did not decode as valid UTF-16.
    #[error("string is not valid UTF-16")]
    InvalidString,

    /// Unexpected end of stream where the framing layer promised a fixed,
    /// already-fully-buffered region (for example, inside a PreLogin option
    /// whose bounds are given by the option table itself).
    #[error("unexpected end of stream")]
    UnexpectedEof,
}
