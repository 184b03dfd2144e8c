//! Edge case tests exercised against a fake TDS server.
//!
//! These run a loopback TCP server on a background thread that speaks just
//! enough of PRELOGIN/LOGIN7/token-stream TDS to drive [`Connection`]
//! through a full handshake and query, so NULL handling and Unicode
//! decoding can be tested deterministically without a real SQL Server
//! instance. Tests requiring an actual server live in `integration.rs` and
//! are `#[ignore]`d by default.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use bytes::{BufMut, BytesMut};
use mssql_driver::row::RowExt;
use mssql_driver::{Config, Connection};
use tds_protocol::packet::{PACKET_HEADER_SIZE, PacketHeader, PacketStatus, PacketType};
use tds_protocol::prelogin::{EncryptionLevel, PreLogin};
use tds_protocol::token::{Done, DoneStatus, TokenType};
use tds_protocol::version::TdsVersion;

fn read_request_pdu(stream: &mut TcpStream) {
    let mut header = [0u8; PACKET_HEADER_SIZE];
    stream.read_exact(&mut header).unwrap();
    let mut header_slice: &[u8] = &header;
    let decoded = PacketHeader::decode(&mut header_slice).unwrap();
    let mut payload = vec![0u8; decoded.payload_length()];
    stream.read_exact(&mut payload).unwrap();
}

fn send_response_pdu(stream: &mut TcpStream, packet_type: PacketType, payload: &[u8]) {
    let header = PacketHeader::new(
        packet_type,
        PacketStatus::END_OF_MESSAGE,
        (PACKET_HEADER_SIZE + payload.len()) as u16,
    );
    let mut out = Vec::with_capacity(PACKET_HEADER_SIZE + payload.len());
    header.encode(&mut out);
    out.extend_from_slice(payload);
    stream.write_all(&out).unwrap();
    stream.flush().unwrap();
}

fn write_utf16le(buf: &mut BytesMut, s: &str) {
    for unit in s.encode_utf16() {
        buf.put_u16_le(unit);
    }
}

fn login_ack_and_done() -> BytesMut {
    let mut buf = BytesMut::new();

    buf.put_u8(TokenType::LoginAck as u8);
    let prog_name = "fake-server";
    let name_units = prog_name.encode_utf16().count() as u8;
    let body_len = 1 + 4 + 1 + (name_units as usize * 2) + 4;
    buf.put_u16_le(body_len as u16);
    buf.put_u8(0x01);
    buf.put_u32_le(0x74_00_00_04);
    buf.put_u8(name_units);
    write_utf16le(&mut buf, prog_name);
    buf.put_u32_le(0x0100_0000);

    Done {
        status: DoneStatus::default(),
        cur_cmd: 0,
        row_count: 0,
    }
    .encode(&mut buf);

    buf
}

/// Two columns: `id INT` (nullable, `IntN`) and `name NVARCHAR` (nullable).
fn two_column_colmetadata() -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u8(TokenType::ColMetaData as u8);
    buf.put_u16_le(2); // column count

    // id: IntN, max length 4, no collation
    buf.put_u16_le(0); // user_type
    buf.put_u16_le(0); // flags
    buf.put_u8(0x26); // IntN
    buf.put_u8(4); // max_length
    buf.put_u8(2); // name length (chars)
    write_utf16le(&mut buf, "id");

    // name: NVarChar, max length 200, collation
    buf.put_u16_le(0);
    buf.put_u16_le(0);
    buf.put_u8(0xE7); // NVarChar
    buf.put_u16_le(200); // max_length
    buf.put_u32_le(0x0000_0409); // lcid: en-US
    buf.put_u8(0); // sort_id
    buf.put_u8(4);
    write_utf16le(&mut buf, "name");

    buf
}

fn row_with_values(id: Option<i32>, name: Option<&str>) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u8(TokenType::Row as u8);

    match id {
        Some(v) => {
            buf.put_u8(4);
            buf.put_i32_le(v);
        }
        None => buf.put_u8(0),
    }

    match name {
        Some(s) => {
            let bytes: Vec<u8> = s.encode_utf16().flat_map(u16::to_le_bytes).collect();
            buf.put_u16_le(bytes.len() as u16);
            buf.put_slice(&bytes);
        }
        None => buf.put_u16_le(0xFFFF),
    }

    buf
}

fn start_fake_server() -> (std::net::SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut sock, _) = listener.accept().unwrap();

        read_request_pdu(&mut sock); // PRELOGIN
        let response = PreLogin::new()
            .with_version(TdsVersion::V7_1_REV1)
            .with_encryption(EncryptionLevel::Off)
            .encode();
        send_response_pdu(&mut sock, PacketType::PreLogin, &response);

        read_request_pdu(&mut sock); // LOGIN7
        let login_resp = login_ack_and_done();
        send_response_pdu(&mut sock, PacketType::TabularResult, &login_resp);

        read_request_pdu(&mut sock); // SQL batch
        let mut query_resp = two_column_colmetadata();
        query_resp.unsplit(row_with_values(Some(1), Some("héllo")));
        query_resp.unsplit(row_with_values(None, None));
        query_resp.unsplit(row_with_values(Some(3), Some("日本語")));
        let mut done = BytesMut::new();
        Done {
            status: DoneStatus {
                count: true,
                ..DoneStatus::default()
            },
            cur_cmd: 0,
            row_count: 3,
        }
        .encode(&mut done);
        query_resp.unsplit(done);
        send_response_pdu(&mut sock, PacketType::TabularResult, &query_resp);
    });

    (addr, handle)
}

#[test]
fn null_fields_and_unicode_text_round_trip() {
    let (addr, server) = start_fake_server();

    let config = Config::new(addr.ip().to_string(), "sa", "Password123!").port(addr.port());
    let mut conn = Connection::connect(config).unwrap();

    let mut rows: Vec<(Option<i32>, Option<String>)> = Vec::new();
    let rows_affected = conn
        .execute_query("SELECT id, name FROM t", |_columns, row| {
            let id = row
                .field(0)
                .and_then(|f| f.as_bytes())
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]));
            let name = row.field(1).and_then(|f| f.as_bytes()).map(|bytes| {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            });
            rows.push((id, name));
        })
        .unwrap();

    server.join().unwrap();

    assert_eq!(rows_affected, 3);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], (Some(1), Some("héllo".to_string())));
    assert_eq!(rows[1], (None, None));
    assert_eq!(rows[2], (Some(3), Some("日本語".to_string())));
}

#[test]
fn connect_reports_authenticated_state_and_tds_version() {
    let (addr, server) = start_fake_server();

    let config = Config::new(addr.ip().to_string(), "sa", "Password123!").port(addr.port());
    let mut conn = Connection::connect(config).unwrap();
    assert!(conn.state().is_authenticated());
    assert!(conn.server_tds_version().is_some());

    // Drain the query the fake server is prepared to send so the thread
    // can exit cleanly.
    let _ = conn.execute_query("SELECT id, name FROM t", |_, _| {});
    server.join().unwrap();
}
