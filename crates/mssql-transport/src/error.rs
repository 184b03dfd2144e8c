//! Transport-level error type.

use thiserror::Error;

/// Errors raised while framing or moving TDS PDUs over a socket.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying socket returned an I/O error.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A write offset or length would overflow the negotiated packet size.
    #[error("write of {len} bytes at offset {offset} exceeds packet size {packet_size}")]
    WriteExceedsPacketSize {
        /// Offset the write was attempted at.
        offset: usize,
        /// Length of the attempted write.
        len: usize,
        /// Negotiated packet size.
        packet_size: u16,
    },

    /// The peer closed the connection mid-PDU.
    #[error("connection closed while reading a PDU header")]
    ConnectionClosed,

    /// A PDU header named a packet type this transport does not recognize.
    #[error(transparent)]
    Protocol(#[from] tds_protocol::ProtocolError),
}
