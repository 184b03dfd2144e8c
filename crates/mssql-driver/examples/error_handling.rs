//! Error handling and recovery patterns example.
//!
//! This example demonstrates how to distinguish transient server errors
//! (worth retrying) from terminal ones (a bug in the query), and how a
//! failed login surfaces as [`DriverError::LoginFailed`].
//!
//! # Running
//!
//! ```bash
//! export MSSQL_HOST=localhost
//! export MSSQL_USER=sa
//! export MSSQL_PASSWORD=YourStrong@Passw0rd
//!
//! cargo run --example error_handling
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::never_loop)]

use std::thread;
use std::time::Duration;

use mssql_driver::{Config, Connection, DriverError};

/// Execute a query, retrying transient errors with exponential backoff.
///
/// There is no async runtime here: retries simply block the calling
/// thread between attempts.
fn execute_with_retry(
    conn: &mut Connection,
    sql: &str,
    max_retries: u32,
) -> Result<u32, DriverError> {
    let mut attempt = 0;
    loop {
        match conn.execute_query(sql, |_, _| {}) {
            Ok(rows_affected) => return Ok(rows_affected),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                println!("  transient error ({e}), retry {attempt}/{max_retries} after {delay:?}");
                thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}

fn main() -> Result<(), DriverError> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("MSSQL_HOST").unwrap_or_else(|_| "localhost".into());
    let user = std::env::var("MSSQL_USER").unwrap_or_else(|_| "sa".into());
    let password = std::env::var("MSSQL_PASSWORD").unwrap_or_else(|_| "Password123!".into());

    println!("=== Error Handling Examples ===\n");

    println!("1. Authentication failure (expected to fail):");
    let bad_config = Config::new(&host, "invalid", "wrong").connect_timeout(Duration::from_secs(5));
    match Connection::connect(bad_config) {
        Ok(_) => println!("  unexpectedly connected!"),
        Err(e @ DriverError::LoginFailed { .. }) => {
            println!("  login failed as expected: {e}");
            println!("  is_transient: {}, is_terminal: {}", e.is_transient(), e.is_terminal());
        }
        Err(e) => println!("  other error: {e}"),
    }

    println!("\n2. A real connection, then a query with automatic retry:");
    let config = Config::new(&host, user, password).database("master");
    let mut conn = Connection::connect(config)?;
    let rows_affected = execute_with_retry(&mut conn, "SELECT @@VERSION", 3)?;
    println!("  rows affected: {rows_affected}");

    println!("\n3. A non-transient error (no amount of retrying helps):");
    match conn.execute_query("SELECT * FROM no_such_table_exists", |_, _| {}) {
        Ok(_) => println!("  unexpectedly succeeded!"),
        Err(e) => {
            println!("  {e}");
            println!(
                "  is_transient: {}, is_terminal: {}",
                e.is_transient(),
                e.is_terminal()
            );
        }
    }

    println!("\n4. Built-in error categorization:");
    demonstrate_error_categorization();

    println!("\nAll error handling examples completed.");
    Ok(())
}

fn demonstrate_error_categorization() {
    let errors = vec![
        (
            "deadlock victim",
            DriverError::ServerError {
                number: 1205,
                class: 13,
                state: 1,
                message: "Transaction was deadlocked".into(),
                server: None,
                procedure: None,
                line: 0,
            },
        ),
        (
            "syntax error",
            DriverError::ServerError {
                number: 102,
                class: 15,
                state: 1,
                message: "Incorrect syntax".into(),
                server: None,
                procedure: None,
                line: 1,
            },
        ),
        ("bad config", DriverError::Config("bad host".into())),
    ];

    for (name, error) in errors {
        let action = if error.is_transient() {
            "retry with backoff"
        } else if error.is_terminal() {
            "fix code/data, redeploy"
        } else {
            "investigate"
        };
        println!(
            "  {name} -> transient: {}, terminal: {} -> {action}",
            error.is_transient(),
            error.is_terminal()
        );
    }
}
