//! An example of querying a SQL Server database and retrieving Chinese
//! characters, to exercise the UTF-16LE round trip end to end.
//!
//! # Running
//!
//! ```bash
//! cargo run --example chinese_query
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mssql_driver::row::RowExt;
use mssql_driver::{Config, Connection, DriverError};

fn main() -> Result<(), DriverError> {
    let host = std::env::var("MSSQL_HOST").unwrap_or_else(|_| "192.168.100.5".into());
    let database = std::env::var("MSSQL_DATABASE").unwrap_or_else(|_| "master".into());
    let user = std::env::var("MSSQL_USER").unwrap_or_else(|_| "sa".into());
    let password = std::env::var("MSSQL_PASSWORD").unwrap_or_else(|_| "@cwc3002#".into());

    let config = Config::new(&host, user, password).database(database);
    let mut conn = Connection::connect(config)?;

    let mut row_count = 0u32;
    conn.execute_query(
        "SELECT CONVERT(VARCHAR(40),'中文') COLLATE Chinese_PRC_CI_AI AS info, \
         CONVERT(NVARCHAR(40),'汉字') AS lang",
        |columns, row| {
            row_count += 1;
            // `info` is VARCHAR under a DBCS collation, not plain UTF-16; this
            // driver never interprets collation/codepage bytes, so it's
            // shown as hex rather than decoded.
            let info = row.field(0).and_then(|f| f.as_bytes());
            // `lang` is NVARCHAR, which is UTF-16LE regardless of collation.
            let lang = row.field(1).and_then(|f| f.as_bytes());

            println!("{}: {:02x?}", columns[0].name, info.unwrap_or(&[]));
            println!(
                "{}: {}",
                columns[1].name,
                lang.map(utf16le_to_string).unwrap_or_default()
            );
        },
    )?;

    println!("Number of rows: {row_count}");
    Ok(())
}

fn utf16le_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
