//! The transport capability contract.
//!
//! A [`Transport`] is everything the login and command layers need from a
//! network connection: a scratch write buffer they can fill (possibly out
//! of order, via [`Transport::write_at`], which the LOGIN7 encoder relies on
//! to patch in its total-length prefix), a way to flush that buffer to the
//! wire as one or more framed PDUs, and a way to read the next complete PDU
//! back. Implementations are free to be a raw TCP socket, an in-memory pipe
//! for tests, or anything else that can move bytes.
//!
//! This crate provides one concrete implementation, [`crate::tcp::TcpTransport`],
//! built on a blocking [`std::net::TcpStream`]. The driver never talks to
//! `TcpStream` directly; it only depends on this trait, which keeps the
//! single-threaded, blocking-cooperative concurrency model explicit at the
//! type level.

use bytes::Bytes;
use tds_protocol::PacketType;

use crate::error::TransportError;

/// Callback invoked once per PDU sent or received, for diagnostics.
pub type PduCallback = Box<dyn FnMut(&[u8]) + Send>;

/// The capability contract a login/command context needs from a connection.
pub trait Transport {
    /// Append `bytes` to the current write buffer.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Overwrite `bytes` at an absolute offset in the current write buffer.
    ///
    /// Used to patch in a length prefix (e.g. LOGIN7's total-length field)
    /// after the rest of the packet has already been written.
    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), TransportError>;

    /// Current length of the write buffer, i.e. where the next
    /// [`Transport::write`] call will land.
    fn current_write_offset(&self) -> usize;

    /// Frame the accumulated write buffer into one or more PDUs of
    /// `packet_type` and send them, clearing the buffer on success.
    fn send(&mut self, packet_type: PacketType) -> Result<(), TransportError>;

    /// Block until a complete PDU has been read from the wire, and return
    /// its payload (header stripped).
    fn receive_pdu(&mut self) -> Result<Bytes, TransportError>;

    /// Negotiate a new packet size for subsequent sends (called after an
    /// ENVCHANGE packet-size token is received).
    fn set_packet_size(&mut self, size: u16);

    /// Register a callback invoked with the raw bytes of every PDU sent or
    /// received, for tracing/diagnostics.
    fn register_pdu_callback(&mut self, callback: PduCallback);
}
