//! Connection configuration.

use std::time::Duration;

use tds_protocol::version::TdsVersion;

/// Configuration for connecting to and logging into SQL Server.
///
/// Covers exactly the surface in scope for this driver: server address,
/// the LOGIN7 parameters, requested packet size, and connect/command
/// timeouts. There is no connection-string DSN parser, no TLS
/// configuration, and no pooling configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Server hostname or IP address.
    pub host: String,

    /// Server port (default: 1433).
    pub port: u16,

    /// SQL login name.
    pub user_name: String,

    /// Cleartext password; obfuscated (nibble-swap + XOR 0xA5) before
    /// transmission, never sent or logged in the clear.
    pub password: String,

    /// Initial database (empty string means the login's default database).
    pub db_name: String,

    /// Workstation identifier reported to the server.
    pub client_name: String,

    /// Application name reported to the server.
    pub app_name: String,

    /// Client library name reported to the server.
    pub library_name: String,

    /// Reported client process ID.
    pub client_pid: u32,

    /// Claimed client program version.
    pub client_program_version: u32,

    /// MAC-like client identifier; zero if not set.
    pub client_id: [u8; 6],

    /// LCID to request, e.g. `0x0000_0409` for en-US. Zero requests the
    /// server's default collation.
    pub collation: u32,

    /// Proposed TDS packet size (default: 4096); the server may override
    /// this via an ENVCHANGE packet-size token during login.
    pub packet_size: u16,

    /// Requested TDS protocol version (default: 7.1).
    pub tds_version: TdsVersion,

    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,

    /// Default timeout for command execution.
    pub command_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1433,
            user_name: String::new(),
            password: String::new(),
            db_name: String::new(),
            client_name: String::new(),
            app_name: String::new(),
            library_name: String::new(),
            client_pid: 0,
            client_program_version: 0x0700_0000,
            client_id: [0; 6],
            collation: 0,
            packet_size: tds_protocol::DEFAULT_PACKET_SIZE as u16,
            tds_version: TdsVersion::V7_1_REV1,
            connect_timeout: Duration::from_secs(15),
            command_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Create a configuration for the given server and SQL login.
    #[must_use]
    pub fn new(host: impl Into<String>, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user_name: user_name.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Set the server port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the initial database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.db_name = database.into();
        self
    }

    /// Set the application name reported to the server.
    #[must_use]
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Set the requested TDS packet size.
    #[must_use]
    pub fn packet_size(mut self, size: u16) -> Self {
        self.packet_size = size;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the default command timeout.
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Build the LOGIN7 packet this configuration describes.
    pub(crate) fn to_login7(&self) -> tds_protocol::Login7 {
        tds_protocol::Login7 {
            tds_version: self.tds_version,
            packet_size: u32::from(self.packet_size),
            client_program_version: self.client_program_version,
            client_pid: self.client_pid,
            client_name: self.client_name.clone(),
            user_name: self.user_name.clone(),
            password: self.password.clone(),
            app_name: self.app_name.clone(),
            server_name: self.host.clone(),
            library_name: self.library_name.clone(),
            db_name: self.db_name.clone(),
            collation: self.collation,
            client_id: self.client_id,
        }
    }
}
