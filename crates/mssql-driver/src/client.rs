//! The blocking SQL Server connection.
//!
//! [`Connection`] owns a [`Transport`] and walks it through pre-login,
//! LOGIN7, and query execution. Everything here runs on the calling
//! thread: a PDU is either fully read before this code continues, or the
//! call blocks. There is no background reader and no multiplexing of
//! concurrent queries on one connection — open another `Connection` for
//! that.

use std::net::ToSocketAddrs;

use tracing::{debug, info, trace};

use mssql_transport::{TcpTransport, Transport};
use tds_protocol::packet::PacketType;
use tds_protocol::prelogin::{EncryptionLevel, PreLogin};
use tds_protocol::sql_batch::encode_sql_batch;
use tds_protocol::token::{
    ColMetaData, DispatchedToken, EnvChangeType, EnvChangeValue, ServerError, TokenDispatch,
};
use tds_protocol::version::TdsVersion;

use crate::cancel::{self, CancelOutcome};
use crate::config::Config;
use crate::error::{DriverError, Result};
use crate::query::Query;
use crate::row::{Column, Row};
use crate::state::ConnectionState;

/// A SQL Server connection speaking TDS 7.1 over some [`Transport`].
///
/// Generic over the transport so tests can swap in an in-memory one; real
/// callers get a [`TcpTransport`] back from [`Connection::connect`].
pub struct Connection<T: Transport = TcpTransport> {
    transport: T,
    dispatch: TokenDispatch,
    state: ConnectionState,
    config: Config,
    server_tds_version: Option<TdsVersion>,
}

impl Connection<TcpTransport> {
    /// Resolve `config.host:config.port`, open a TCP connection, and run
    /// pre-login and LOGIN7 to authenticate.
    pub fn connect(config: Config) -> Result<Self> {
        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(mssql_transport::TransportError::Io)?
            .next()
            .ok_or_else(|| {
                DriverError::Config(format!(
                    "could not resolve {}:{}",
                    config.host, config.port
                ))
            })?;

        info!(host = %config.host, port = config.port, "connecting");
        let transport = TcpTransport::connect_timeout(&addr, config.connect_timeout)?;
        Self::from_transport(transport, config)
    }
}

impl<T: Transport> Connection<T> {
    /// Build a connection around an already-open transport, running
    /// pre-login and LOGIN7 over it.
    ///
    /// Exposed separately from [`Connection::connect`] so tests can drive
    /// the handshake against a non-TCP [`Transport`].
    pub fn from_transport(mut transport: T, config: Config) -> Result<Self> {
        Self::prelogin(&mut transport)?;

        let mut dispatch = TokenDispatch::new();
        let server_tds_version = Self::login(&mut transport, &config, &mut dispatch)?;

        Ok(Self {
            transport,
            dispatch,
            state: ConnectionState::Authenticated,
            config,
            server_tds_version,
        })
    }

    /// The connection's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The TDS version the server acknowledged during login, if login has
    /// completed.
    #[must_use]
    pub fn server_tds_version(&self) -> Option<TdsVersion> {
        self.server_tds_version
    }

    /// The configuration this connection was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn prelogin(transport: &mut T) -> Result<PreLogin> {
        let request = PreLogin::new()
            .with_version(TdsVersion::V7_1_REV1)
            .with_encryption(EncryptionLevel::NotSupported);

        transport.write(&request.encode())?;
        transport.send(PacketType::PreLogin)?;

        let pdu = transport.receive_pdu()?;
        let response = PreLogin::decode(pdu.as_ref())?;

        if response.encryption.is_required() {
            return Err(DriverError::InvalidLoginResponse(
                "server requires an encrypted connection; TLS is not supported by this driver"
                    .to_string(),
            ));
        }

        trace!(encryption = ?response.encryption, "pre-login complete");
        Ok(response)
    }

    fn login(
        transport: &mut T,
        config: &Config,
        dispatch: &mut TokenDispatch,
    ) -> Result<Option<TdsVersion>> {
        let login7 = config.to_login7();
        transport.write(&login7.encode())?;
        transport.send(PacketType::Tds7Login)?;

        let mut server_tds_version = None;
        let mut saw_login_ack = false;
        let mut last_error: Option<ServerError> = None;
        let mut done = false;

        while !done {
            let pdu = transport.receive_pdu()?;
            dispatch.feed(pdu, |token| match token {
                DispatchedToken::LoginAck(ack) => {
                    debug!(
                        tds_version = %ack.tds_version(),
                        prog_name = %ack.prog_name,
                        "login acknowledged"
                    );
                    saw_login_ack = true;
                    server_tds_version = Some(ack.tds_version());
                }
                DispatchedToken::EnvChange(change) => {
                    if change.env_type == EnvChangeType::PacketSize {
                        if let EnvChangeValue::String(new_size) = &change.new_value {
                            if let Ok(size) = new_size.parse::<u16>() {
                                debug!(packet_size = size, "server negotiated packet size");
                                transport.set_packet_size(size);
                            }
                        }
                    }
                }
                DispatchedToken::Error(err) => last_error = Some(err),
                DispatchedToken::Done(d) => {
                    if !d.status.more {
                        done = true;
                    }
                }
                DispatchedToken::Info(_)
                | DispatchedToken::Row(_)
                | DispatchedToken::ColMetaData(_)
                | DispatchedToken::DoneProc(_)
                | DispatchedToken::DoneInProc(_) => {}
            })?;
        }

        if let Some(err) = last_error {
            return Err(DriverError::LoginFailed {
                number: err.number,
                message: err.message,
            });
        }
        if !saw_login_ack {
            return Err(DriverError::InvalidLoginResponse(
                "server never sent a LOGINACK token".to_string(),
            ));
        }

        Ok(server_tds_version)
    }

    /// Send a SQL text batch and invoke `on_row` for each row of each
    /// result set, in order.
    ///
    /// Returns the row count reported by the batch's final `DONE` token —
    /// for a multi-statement batch this is the count from the last
    /// statement, matching what `@@ROWCOUNT` would report. There is no
    /// parameter binding (build the SQL text yourself) and no RPC path.
    pub fn execute_query(
        &mut self,
        query: impl Into<Query>,
        mut on_row: impl FnMut(&[Column], &Row),
    ) -> Result<u32> {
        if !self.state.is_authenticated() {
            return Err(DriverError::InvalidState {
                expected: "Authenticated",
                actual: state_label(self.state),
            });
        }

        let query = query.into();
        debug!(sql = query.sql(), "executing query");

        let payload = encode_sql_batch(query.sql());
        self.transport.write(&payload)?;
        self.transport.send(PacketType::SqlBatch)?;

        let mut current_columns: Option<ColMetaData> = None;
        let mut rows_affected: u32 = 0;
        let mut last_error: Option<ServerError> = None;
        let mut batch_done = false;
        let mut batch_errored = false;

        while !batch_done {
            let pdu = match self.transport.receive_pdu() {
                Ok(pdu) => pdu,
                Err(e) => {
                    self.state = ConnectionState::Poisoned;
                    return Err(e.into());
                }
            };

            self.dispatch.feed(pdu, |token| match token {
                DispatchedToken::ColMetaData(cmd) => current_columns = Some(cmd),
                DispatchedToken::Row(row) => {
                    if let Some(cols) = &current_columns {
                        on_row(&cols.columns, &row);
                    }
                }
                DispatchedToken::Error(err) => last_error = Some(err),
                DispatchedToken::Info(info) => {
                    trace!(number = info.number, message = %info.message, "server info");
                }
                DispatchedToken::Done(d) => {
                    if d.status.count {
                        rows_affected = d.row_count;
                    }
                    if !d.status.more {
                        batch_done = true;
                        batch_errored = d.status.error;
                    }
                }
                DispatchedToken::DoneProc(d) => {
                    if d.status.count {
                        rows_affected = d.row_count;
                    }
                }
                DispatchedToken::DoneInProc(d) => {
                    if d.status.count {
                        rows_affected = d.row_count;
                    }
                }
                DispatchedToken::LoginAck(_) | DispatchedToken::EnvChange(_) => {}
            })?;
        }

        if batch_errored {
            let err = last_error.unwrap_or_else(|| ServerError {
                number: 0,
                state: 0,
                class: 0,
                message: "batch failed with no accompanying ERROR token".to_string(),
                server: String::new(),
                procedure: String::new(),
                line: 0,
            });
            return Err(server_error_into_driver_error(err));
        }

        Ok(rows_affected)
    }

    /// Send an ATTENTION and drain the stream until the server acknowledges
    /// the cancellation. See [`crate::cancel`] for why this exists as a
    /// distinct method rather than a handle usable from another thread.
    pub fn cancel(&mut self) -> Result<CancelOutcome> {
        cancel::cancel(&mut self.transport, &mut self.dispatch)
    }
}

fn server_error_into_driver_error(err: ServerError) -> DriverError {
    DriverError::ServerError {
        number: err.number,
        class: err.class,
        state: err.state,
        message: err.message,
        server: non_empty(err.server),
        procedure: non_empty(err.procedure),
        line: err.line,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn state_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Disconnected => "Disconnected",
        ConnectionState::Connected => "Connected",
        ConnectionState::Authenticated => "Authenticated",
        ConnectionState::Poisoned => "Poisoned",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::{Bytes, BytesMut};
    use mssql_transport::TransportError;
    use std::collections::VecDeque;
    use tds_protocol::token::{Done, DoneStatus};

    /// An in-memory [`Transport`] fed with pre-baked PDUs, so login and
    /// query handling can be exercised without a socket.
    #[derive(Default)]
    struct MockTransport {
        write_buf: BytesMut,
        inbox: VecDeque<Bytes>,
        sent: Vec<(PacketType, Bytes)>,
        packet_size: u16,
    }

    impl Transport for MockTransport {
        fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), TransportError> {
            self.write_buf.extend_from_slice(bytes);
            Ok(())
        }

        fn write_at(
            &mut self,
            offset: usize,
            bytes: &[u8],
        ) -> std::result::Result<(), TransportError> {
            self.write_buf[offset..offset + bytes.len()].copy_from_slice(bytes);
            Ok(())
        }

        fn current_write_offset(&self) -> usize {
            self.write_buf.len()
        }

        fn send(&mut self, packet_type: PacketType) -> std::result::Result<(), TransportError> {
            let payload = self.write_buf.split().freeze();
            self.sent.push((packet_type, payload));
            Ok(())
        }

        fn receive_pdu(&mut self) -> std::result::Result<Bytes, TransportError> {
            self.inbox.pop_front().ok_or(TransportError::ConnectionClosed)
        }

        fn set_packet_size(&mut self, size: u16) {
            self.packet_size = size;
        }

        fn register_pdu_callback(&mut self, _callback: mssql_transport::PduCallback) {}
    }

    fn encode_prelogin_response() -> Bytes {
        PreLogin::new()
            .with_version(TdsVersion::V7_1_REV1)
            .with_encryption(EncryptionLevel::Off)
            .encode()
    }

    fn encode_login_ack_and_done() -> Bytes {
        use bytes::BufMut;
        use tds_protocol::token::TokenType;

        let mut buf = BytesMut::new();

        // LOGINACK: type, length, interface, tds_version, prog_name (b_varchar), prog_version
        buf.put_u8(TokenType::LoginAck as u8);
        let prog_name = "mssql-driver";
        let prog_name_utf16_len = prog_name.encode_utf16().count() as u8;
        let body_len = 1 + 4 + 1 + (prog_name_utf16_len as usize * 2) + 4;
        buf.put_u16_le(body_len as u16);
        buf.put_u8(0x01); // interface: SQL
        buf.put_u32_le(0x74_00_00_04); // TDS 7.4
        buf.put_u8(prog_name_utf16_len);
        for unit in prog_name.encode_utf16() {
            buf.put_u16_le(unit);
        }
        buf.put_u32_le(0x0100_0000);

        let done = Done {
            status: DoneStatus::default(),
            cur_cmd: 0,
            row_count: 0,
        };
        done.encode(&mut buf);

        buf.freeze()
    }

    #[test]
    fn login_sets_authenticated_state_and_tds_version() {
        let mut transport = MockTransport::default();
        transport.inbox.push_back(encode_prelogin_response());
        transport.inbox.push_back(encode_login_ack_and_done());

        let config = Config::new("testhost", "sa", "secret");
        let conn = Connection::from_transport(transport, config).unwrap();

        assert_eq!(conn.state(), ConnectionState::Authenticated);
        assert!(conn.server_tds_version().is_some());
    }

    #[test]
    fn login_fails_when_server_requires_encryption() {
        let mut transport = MockTransport::default();
        transport.inbox.push_back(
            PreLogin::new()
                .with_version(TdsVersion::V7_1_REV1)
                .with_encryption(EncryptionLevel::Required)
                .encode(),
        );

        let config = Config::new("testhost", "sa", "secret");
        let err = Connection::from_transport(transport, config).unwrap_err();
        assert!(matches!(err, DriverError::InvalidLoginResponse(_)));
    }

    #[test]
    fn execute_query_rejects_unauthenticated_connection() {
        let transport = MockTransport::default();
        let mut conn = Connection {
            transport,
            dispatch: TokenDispatch::new(),
            state: ConnectionState::Connected,
            config: Config::new("testhost", "sa", "secret"),
            server_tds_version: None,
        };
        let err = conn.execute_query("SELECT 1", |_, _| {}).unwrap_err();
        assert!(matches!(err, DriverError::InvalidState { .. }));
    }

    #[test]
    fn login_surfaces_server_error_as_login_failed() {
        use bytes::BufMut;
        use tds_protocol::token::TokenType;

        let mut transport = MockTransport::default();
        transport.inbox.push_back(encode_prelogin_response());

        let mut error_pdu = BytesMut::new();
        error_pdu.put_u8(TokenType::Error as u8);
        // length(2) + number(4) + state(1) + class(1) + message(us_varchar) + server(b_varchar) + procedure(b_varchar) + line(4)
        let message = "Login failed for user 'sa'.";
        let message_len = message.encode_utf16().count() as u16;
        let body_len = 4 + 1 + 1 + 2 + (message_len as usize * 2) + 1 + 1 + 4;
        error_pdu.put_u16_le(body_len as u16);
        error_pdu.put_i32_le(18456);
        error_pdu.put_u8(1);
        error_pdu.put_u8(14);
        error_pdu.put_u16_le(message_len);
        for unit in message.encode_utf16() {
            error_pdu.put_u16_le(unit);
        }
        error_pdu.put_u8(0); // server name length
        error_pdu.put_u8(0); // procedure name length
        error_pdu.put_i32_le(1);

        let done = Done {
            status: DoneStatus {
                error: true,
                ..DoneStatus::default()
            },
            cur_cmd: 0,
            row_count: 0,
        };
        done.encode(&mut error_pdu);

        transport.inbox.push_back(error_pdu.freeze());

        let config = Config::new("testhost", "sa", "secret");
        let err = Connection::from_transport(transport, config).unwrap_err();
        match err {
            DriverError::LoginFailed { number, message } => {
                assert_eq!(number, 18456);
                assert!(message.contains("Login failed"));
            }
            other => panic!("expected LoginFailed, got {other:?}"),
        }
    }
}
