//! # mssql-transport
//!
//! Blocking TDS packet transport for SQL Server.
//!
//! This crate sits between a raw socket and the driver: it frames outgoing
//! bytes into PDUs no larger than the negotiated packet size, and hands back
//! complete PDUs (header stripped) as they arrive. It knows nothing about
//! LOGIN7, tokens, or SQL batches; those live in `tds-protocol` and
//! `mssql-driver`.
//!
//! ## Architecture
//!
//! ```text
//! TcpStream <-> TcpTransport (this crate) <-> driver (tds_protocol::token::TokenParser)
//! ```
//!
//! The driver is single-threaded and blocking-cooperative: there is no
//! background reader task and no async runtime. Canceling a running query
//! means writing an ATTENTION PDU on the same connection and then
//! synchronously draining PDUs until the server's cancellation
//! acknowledgment arrives (see `mssql_driver::cancel`).

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod tcp;
pub mod transport;

pub use error::TransportError;
pub use tcp::TcpTransport;
pub use transport::{PduCallback, Transport};
