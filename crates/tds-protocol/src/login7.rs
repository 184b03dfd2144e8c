//! TDS LOGIN7 packet construction.
//!
//! The LOGIN7 packet is sent by the client to authenticate with SQL Server.
//! It carries client identification, the target database, and the login
//! credentials. This crate targets the TDS 7.1 wire shape: a 36-byte fixed
//! header, a table of nine offset/length (`ib`/`cch`) pairs describing the
//! variable-length fields, six raw client-id bytes, two more offset/length
//! pairs, and finally the UCS-2LE string data the pairs point into.
//!
//! No feature extension block, SSPI blob, or change-password support is
//! encoded: this crate speaks plain SQL-login LOGIN7 only.
//!
//! ## Security Note
//!
//! The password is obfuscated (not encrypted) using a nibble swap plus XOR.
//! Always use TLS at the transport layer if confidentiality matters; this
//! crate does not implement TLS.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::write_utf16_string;
use crate::version::TdsVersion;

/// Size of the fixed LOGIN7 header, before the offset/length table.
pub const LOGIN7_HEADER_SIZE: usize = 36;

/// Size of the nine offset/length pairs preceding the raw client id.
const IB_CCH_TABLE_SIZE: usize = 9 * 4;

/// Size of the raw (non-offset/length) client id field.
const CLIENT_ID_SIZE: usize = 6;

/// Size of the two offset/length pairs following the client id (SSPI,
/// attach-db-filename).
const TAIL_TABLE_SIZE: usize = 2 * 4;

/// Total size of the fixed-layout section, before variable string data.
///
/// `hostname`'s `ib` field always equals this value: it is where the
/// variable-length data begins.
pub const LOGIN7_FIXED_SIZE: usize =
    LOGIN7_HEADER_SIZE + IB_CCH_TABLE_SIZE + CLIENT_ID_SIZE + TAIL_TABLE_SIZE;

/// OptionFlags1 byte sent on every LOGIN7 packet.
///
/// Bits 5-7 (`fUseDB`, `fDatabase`, `fSetLang`) are set: the server is asked
/// to notify on `USE` statements and to treat a failed database or language
/// switch as a fatal login error. Bits 0-4 stay at their little-endian /
/// ASCII / IEEE-754 / dump-load-on defaults.
pub const OPTION_FLAGS_1: u8 = 0xE0;

/// OptionFlags2 byte sent on every LOGIN7 packet.
///
/// `fLanguageFatal` and `fODBC` are both set; no integrated security, no
/// user-type override.
pub const OPTION_FLAGS_2: u8 = 0x03;

/// TypeFlags byte sent on every LOGIN7 packet (plain SQL batch language,
/// no OLEDB, no read-only intent).
pub const TYPE_FLAGS: u8 = 0x00;

/// OptionFlags3 byte sent on every LOGIN7 packet (no change password, no
/// binary XML, no extension block, default collation handling).
pub const OPTION_FLAGS_3: u8 = 0x00;

/// Parameters needed to build a LOGIN7 packet.
///
/// Field names follow the wire terminology where it differs from the
/// caller-facing name: `client_name` is written into the packet's
/// "hostname" slot, and `server_name` is written into its "servername"
/// slot.
#[derive(Debug, Clone)]
pub struct Login7 {
    /// TDS version to advertise. Defaults to TDS 7.1 (`0x71000001`).
    pub tds_version: TdsVersion,
    /// Requested negotiated packet size, in bytes.
    pub packet_size: u32,
    /// Client program (driver) version, reported verbatim.
    pub client_program_version: u32,
    /// Client process id.
    pub client_pid: u32,
    /// Client workstation name. Written into the LOGIN7 "hostname" field.
    pub client_name: String,
    /// SQL Server login name.
    pub user_name: String,
    /// SQL Server login password, in cleartext. Obfuscated on the wire.
    pub password: String,
    /// Client application name.
    pub app_name: String,
    /// Target server hostname, as given to `connect()`.
    pub server_name: String,
    /// Client library name (the name of this driver).
    pub library_name: String,
    /// Initial database to use after login. Empty string selects the
    /// login's default database.
    pub db_name: String,
    /// Client LCID / collation identifier. `0` lets the server choose.
    pub collation: u32,
    /// Six-byte client identifier (commonly derived from a MAC address).
    /// All-zero by default.
    pub client_id: [u8; 6],
}

impl Default for Login7 {
    fn default() -> Self {
        Self {
            tds_version: TdsVersion::V7_1_REV1,
            packet_size: 4096,
            client_program_version: 0x0700_0000,
            client_pid: 0,
            client_name: String::new(),
            user_name: String::new(),
            password: String::new(),
            app_name: String::new(),
            server_name: String::new(),
            library_name: String::new(),
            db_name: String::new(),
            collation: 0,
            client_id: [0; 6],
        }
    }
}

impl Login7 {
    /// Create a new LOGIN7 builder with TDS 7.1 defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode this LOGIN7 packet body (no TDS PDU header) as bytes.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        // Each field is written into `strings` in wire order, and its
        // offset/length pair is recorded in `fields` at the matching
        // position. The "unused" slot never advances the cursor and is
        // always (0, 0), matching observed server behavior.
        let mut strings = BytesMut::new();
        let mut field = |s: &str, cursor: &mut u16| -> (u16, u16) {
            let offset = *cursor;
            let char_len = s.encode_utf16().count() as u16;
            write_utf16_string(&mut strings, s);
            *cursor += char_len * 2;
            (offset, char_len)
        };

        let mut cursor = LOGIN7_FIXED_SIZE as u16;
        let hostname = field(&self.client_name, &mut cursor);
        let username = field(&self.user_name, &mut cursor);

        let password_offset = cursor;
        let password_len = self.password.encode_utf16().count() as u16;
        write_obfuscated_password(&mut strings, &self.password);
        cursor += password_len * 2;
        let password = (password_offset, password_len);

        let appname = field(&self.app_name, &mut cursor);
        let servername = field(&self.server_name, &mut cursor);
        let unused = (0u16, 0u16);
        let libname = field(&self.library_name, &mut cursor);
        // "language" has no caller-facing parameter: always empty, but it
        // still occupies a slot in the offset table and the running cursor.
        let language = (cursor, 0u16);
        let database = field(&self.db_name, &mut cursor);

        let total_length = (LOGIN7_FIXED_SIZE + strings.len()) as u32;

        let mut buf = BytesMut::with_capacity(total_length as usize);
        buf.put_u32_le(total_length);
        buf.put_u32_le(self.tds_version.raw());
        buf.put_u32_le(self.packet_size);
        buf.put_u32_le(self.client_program_version);
        buf.put_u32_le(self.client_pid);
        buf.put_u32_le(0); // connection id, always zero on first login
        buf.put_u8(OPTION_FLAGS_1);
        buf.put_u8(OPTION_FLAGS_2);
        buf.put_u8(TYPE_FLAGS);
        buf.put_u8(OPTION_FLAGS_3);
        buf.put_i32_le(0); // client timezone, offset from UTC in minutes
        buf.put_u32_le(self.collation);

        for (offset, len) in [
            hostname, username, password, appname, servername, unused, libname, language,
            database,
        ] {
            buf.put_u16_le(offset);
            buf.put_u16_le(len);
        }

        buf.put_slice(&self.client_id);

        // SSPI is never populated: no integrated/Windows auth support.
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        // AtchDBFile: cursor-tracked but always zero length.
        buf.put_u16_le(cursor);
        buf.put_u16_le(0);

        buf.put(strings);

        buf.freeze()
    }
}

/// Obfuscate a password for the wire: nibble-swap each byte, then XOR with
/// `0xA5`. This is TDS's documented password "encryption" and provides no
/// real confidentiality; it exists only to keep a password from being
/// trivially visible in a packet capture.
fn write_obfuscated_password(dst: &mut impl BufMut, password: &str) {
    for c in password.encode_utf16() {
        let low = (c & 0xFF) as u8;
        let high = ((c >> 8) & 0xFF) as u8;

        let low_enc = low.rotate_right(4) ^ 0xA5;
        let high_enc = high.rotate_right(4) ^ 0xA5;

        dst.put_u8(low_enc);
        dst.put_u8(high_enc);
    }
}
