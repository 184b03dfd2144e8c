//! # tds-protocol
//!
//! Pure implementation of the MS-TDS (Tabular Data Stream) protocol used by
//! Microsoft SQL Server, targeting the TDS 7.1 login/query/result-set subset:
//! LOGIN7, SQL_BATCH, and the COLMETADATA/ROW/DONE/INFO/ERROR/LOGINACK/ENVCHANGE
//! token stream.
//!
//! This crate provides `no_std` compatible packet structures, token parsing,
//! and serialization. It contains no networking logic: the token parser is
//! built around a resumable "not enough bytes" signal so a caller can feed it
//! one PDU at a time without losing state across PDU boundaries.
//!
//! ## Features
//!
//! - `std` (default): Enable standard library support
//! - `alloc`: Enable allocation without full std (requires `alloc` crate)
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. Higher-level crates (`mssql-transport`,
//! `mssql-driver`) build on this foundation to drive an actual socket.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tds_protocol::{PacketHeader, PacketType, PacketStatus};
//!
//! let header = PacketHeader {
//!     packet_type: PacketType::SqlBatch,
//!     status: PacketStatus::END_OF_MESSAGE,
//!     length: 100,
//!     spid: 0,
//!     packet_id: 1,
//!     window: 0,
//! };
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod codec;
pub mod error;
pub mod login7;
pub mod packet;
pub mod prelogin;
pub mod prelude;
pub mod sql_batch;
pub mod token;
pub mod types;
pub mod version;

pub use error::ProtocolError;
pub use packet::{
    DEFAULT_PACKET_SIZE, MAX_PACKET_SIZE, PACKET_HEADER_SIZE, PacketHeader, PacketStatus,
    PacketType,
};
pub use prelogin::{EncryptionLevel, PreLogin, PreLoginOption};
pub use token::{
    ColMetaData, ColumnData, Collation, DispatchedToken, Done, DoneInProc, DoneProc, DoneStatus,
    EnvChange, EnvChangeType, EnvChangeValue, LoginAck, Row, RowField, ServerError, ServerInfo,
    Token, TokenDispatch, TokenParser, TokenType, TypeInfo,
};
pub use types::{ColumnFlags, SizeClass, TypeId, TypeProperties};
pub use login7::{
    LOGIN7_FIXED_SIZE, Login7, OPTION_FLAGS_1, OPTION_FLAGS_2, OPTION_FLAGS_3, TYPE_FLAGS,
};
pub use version::TdsVersion;
pub use sql_batch::encode_sql_batch;
