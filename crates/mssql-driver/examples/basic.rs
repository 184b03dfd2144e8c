//! Basic connection and query example.
//!
//! This example demonstrates how to connect to SQL Server and execute a
//! simple query.
//!
//! # Running
//!
//! ```bash
//! export MSSQL_HOST=localhost
//! export MSSQL_DATABASE=master
//! export MSSQL_USER=sa
//! export MSSQL_PASSWORD=YourStrong@Passw0rd
//!
//! cargo run --example basic
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use mssql_driver::row::RowExt;
use mssql_driver::{Config, Connection, DriverError};

fn main() -> Result<(), DriverError> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("MSSQL_HOST").unwrap_or_else(|_| "localhost".into());
    let database = std::env::var("MSSQL_DATABASE").unwrap_or_else(|_| "master".into());
    let user = std::env::var("MSSQL_USER").unwrap_or_else(|_| "sa".into());
    let password = std::env::var("MSSQL_PASSWORD").unwrap_or_else(|_| "Password123!".into());

    let config = Config::new(&host, user, password)
        .database(database)
        .application_name("mssql-driver-basic-example");

    println!("Connecting to SQL Server at {host}...");
    let mut conn = Connection::connect(config)?;
    println!("Connected (TDS version: {:?})", conn.server_tds_version());

    let rows_affected = conn.execute_query("SELECT @@VERSION AS version", |columns, row| {
        for (i, column) in columns.iter().enumerate() {
            let Some(bytes) = row.field(i).and_then(|f| f.as_bytes()) else {
                println!("{}: NULL", column.name);
                continue;
            };
            println!("{}: {}", column.name, utf16le_to_string(bytes));
        }
    })?;
    println!("rows affected: {rows_affected}");

    Ok(())
}

/// `NVARCHAR`/`NTEXT` columns are UTF-16LE on the wire; decode them for
/// display. There is no general `FromSql` conversion layer in this driver —
/// callers interpret [`mssql_driver::RowField`] bytes themselves.
fn utf16le_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
