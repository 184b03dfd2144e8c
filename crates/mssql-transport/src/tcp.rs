//! Blocking TCP transport.

use std::io::{Read, Write};
use std::net::TcpStream;

use bytes::{Bytes, BytesMut};
use tds_protocol::{PACKET_HEADER_SIZE, PacketHeader, PacketStatus, PacketType};
use tracing::trace;

use crate::error::TransportError;
use crate::transport::{PduCallback, Transport};

/// A [`Transport`] backed by a blocking [`TcpStream`].
///
/// Writes accumulate in an in-memory buffer; [`Transport::send`] slices that
/// buffer into PDUs no larger than the negotiated packet size and writes
/// them to the socket in order, setting the end-of-message status bit only
/// on the final PDU. Reads block on the socket until a full PDU (header +
/// declared payload) has been assembled, looping over partial `read` calls
/// as needed.
pub struct TcpTransport {
    stream: TcpStream,
    write_buf: BytesMut,
    packet_size: u16,
    next_packet_id: u8,
    pdu_callback: Option<PduCallback>,
}

impl TcpTransport {
    /// Connect to `addr` and wrap the resulting socket.
    pub fn connect(addr: impl std::net::ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    /// Connect to a single resolved address, aborting if it takes longer
    /// than `timeout`.
    pub fn connect_timeout(
        addr: &std::net::SocketAddr,
        timeout: std::time::Duration,
    ) -> Result<Self, TransportError> {
        let stream = TcpStream::connect_timeout(addr, timeout)?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-connected stream.
    #[must_use]
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            write_buf: BytesMut::new(),
            packet_size: tds_protocol::DEFAULT_PACKET_SIZE as u16,
            next_packet_id: 1,
            pdu_callback: None,
        }
    }

    fn max_payload_per_packet(&self) -> usize {
        (self.packet_size as usize).saturating_sub(PACKET_HEADER_SIZE)
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.write_buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), TransportError> {
        if offset + bytes.len() > self.write_buf.len() {
            return Err(TransportError::WriteExceedsPacketSize {
                offset,
                len: bytes.len(),
                packet_size: self.packet_size,
            });
        }
        self.write_buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn current_write_offset(&self) -> usize {
        self.write_buf.len()
    }

    fn send(&mut self, packet_type: PacketType) -> Result<(), TransportError> {
        let payload = self.write_buf.split().freeze();
        let max_payload = self.max_payload_per_packet().max(1);
        let chunks: Vec<&[u8]> = if payload.is_empty() {
            vec![&[]]
        } else {
            payload.chunks(max_payload).collect()
        };
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.iter().enumerate() {
            let status = if i == last {
                PacketStatus::END_OF_MESSAGE
            } else {
                PacketStatus::NORMAL
            };
            let header = PacketHeader::new(
                packet_type,
                status,
                (PACKET_HEADER_SIZE + chunk.len()) as u16,
            )
            .with_packet_id(self.next_packet_id);

            let mut out = Vec::with_capacity(PACKET_HEADER_SIZE + chunk.len());
            header.encode(&mut out);
            out.extend_from_slice(chunk);

            if let Some(cb) = self.pdu_callback.as_mut() {
                cb(&out);
            }
            trace!(packet_type = ?packet_type, len = out.len(), "sending PDU");
            self.stream.write_all(&out)?;
            self.next_packet_id = self.next_packet_id.wrapping_add(1);
        }
        self.stream.flush()?;
        Ok(())
    }

    fn receive_pdu(&mut self) -> Result<Bytes, TransportError> {
        let mut header_buf = [0u8; PACKET_HEADER_SIZE];
        read_exact_or_closed(&mut self.stream, &mut header_buf)?;

        let mut header_slice: &[u8] = &header_buf;
        let header = PacketHeader::decode(&mut header_slice)?;

        let mut payload = vec![0u8; header.payload_length()];
        read_exact_or_closed(&mut self.stream, &mut payload)?;

        if let Some(cb) = self.pdu_callback.as_mut() {
            let mut full = header_buf.to_vec();
            full.extend_from_slice(&payload);
            cb(&full);
        }
        trace!(packet_type = ?header.packet_type, len = payload.len(), "received PDU");

        Ok(Bytes::from(payload))
    }

    fn set_packet_size(&mut self, size: u16) {
        self.packet_size = size;
    }

    fn register_pdu_callback(&mut self, callback: PduCallback) {
        self.pdu_callback = Some(callback);
    }
}

/// `TcpStream::read_exact` reports a generic `UnexpectedEof`; translate that
/// specifically to [`TransportError::ConnectionClosed`] for a clearer error
/// at the driver layer.
fn read_exact_or_closed(stream: &mut TcpStream, buf: &mut [u8]) -> Result<(), TransportError> {
    match stream.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(TransportError::ConnectionClosed)
        }
        Err(e) => Err(e.into()),
    }
}
