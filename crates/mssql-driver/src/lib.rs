//! # mssql-driver
//!
//! Blocking SQL Server client driver, speaking TDS 7.1 over
//! [`mssql_transport::TcpTransport`].
//!
//! The driver is single-threaded and blocking-cooperative: there is no
//! background reader task and no async runtime (see `mssql_transport` for the
//! rationale). A caller that wants concurrency opens multiple
//! [`Connection`]s.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mssql_driver::{Config, Connection};
//!
//! let config = Config::new("localhost", "sa", "Password123!");
//! let mut conn = Connection::connect(config)?;
//!
//! let affected = conn.execute_query("SELECT * FROM users", |_cols, row| {
//!     println!("{:?}", row);
//! })?;
//! println!("{affected} rows");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod row;
pub mod state;

pub use cancel::CancelOutcome;
pub use client::Connection;
pub use config::Config;
pub use error::{DriverError, Result};
pub use query::Query;
pub use row::{Column, Row, RowField};
pub use state::ConnectionState;
pub use tds_protocol::version::TdsVersion;
