//! SQL Server resilience and recovery tests.
//!
//! These validate driver behavior when a connection is disrupted server-side.
//! Run with:
//!
//! ```bash
//! MSSQL_HOST=localhost MSSQL_USER=sa MSSQL_PASSWORD='YourStrong@Passw0rd' \
//!     cargo test -p mssql-driver --test resilience -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use mssql_driver::row::RowExt;
use mssql_driver::{Config, Connection};

fn get_test_config() -> Option<Config> {
    let host = std::env::var("MSSQL_HOST").ok()?;
    let user = std::env::var("MSSQL_USER").unwrap_or_else(|_| "sa".into());
    let password = std::env::var("MSSQL_PASSWORD").unwrap_or_else(|_| "YourStrong@Passw0rd".into());
    let database = std::env::var("MSSQL_DATABASE").unwrap_or_else(|_| "master".into());

    Some(Config::new(host, user, password).database(database))
}

fn int_field(row: &mssql_driver::Row, index: usize) -> Option<i32> {
    row.field(index)
        .and_then(|f| f.as_bytes())
        .filter(|b| b.len() == 4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

// ---------------------------------------------------------------------------
// Connection state detection
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires SQL Server"]
fn detects_connection_killed_by_another_session() {
    let config = get_test_config().expect("SQL Server config required");
    let mut conn = Connection::connect(config.clone()).expect("failed to connect");

    let mut spid = 0;
    conn.execute_query("SELECT @@SPID AS spid", |_, row| {
        spid = int_field(row, 0).unwrap_or(0);
    })
    .expect("query failed");
    assert!(spid > 0, "should have a valid SPID");

    let mut admin = Connection::connect(config).expect("failed to connect admin");
    admin
        .execute_query(&format!("KILL {spid}"), |_, _| {})
        .expect("failed to kill session");

    std::thread::sleep(Duration::from_millis(200));

    let result = conn.execute_query("SELECT 1", |_, _| {});
    assert!(result.is_err(), "query should fail on a killed connection");
}

#[test]
#[ignore = "requires SQL Server"]
fn connect_completes_within_its_configured_timeout() {
    let config = get_test_config()
        .expect("SQL Server config required")
        .connect_timeout(Duration::from_secs(10));

    let conn = Connection::connect(config).expect("connection should succeed");
    assert!(conn.state().is_authenticated());
}

#[test]
#[ignore = "requires SQL Server"]
fn connect_to_an_unreachable_host_fails_fast() {
    // 10.255.255.1 is a non-routable address reserved for this purpose;
    // the transport should error out rather than hang.
    let config = Config::new("10.255.255.1", "sa", "irrelevant")
        .connect_timeout(Duration::from_secs(3));

    let start = std::time::Instant::now();
    let result = Connection::connect(config);
    assert!(result.is_err());
    assert!(start.elapsed() < Duration::from_secs(10));
}

// ---------------------------------------------------------------------------
// Recovery after errors
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires SQL Server"]
fn recovers_after_a_syntax_error() {
    let config = get_test_config().expect("SQL Server config required");
    let mut conn = Connection::connect(config).expect("failed to connect");

    let result = conn.execute_query("SELEKT * FROM nonexistent", |_, _| {});
    assert!(result.is_err(), "invalid SQL should fail");

    let mut recovered = 0;
    conn.execute_query("SELECT 1 AS recovered", |_, row| {
        recovered = int_field(row, 0).unwrap_or(0);
    })
    .expect("recovery query should succeed");
    assert_eq!(recovered, 1);
}

#[test]
#[ignore = "requires SQL Server"]
fn recovers_after_a_constraint_violation() {
    let config = get_test_config().expect("SQL Server config required");
    let mut conn = Connection::connect(config).expect("failed to connect");

    conn.execute_query(
        "CREATE TABLE #resilience_test (id INT PRIMARY KEY)",
        |_, _| {},
    )
    .expect("setup failed");
    conn.execute_query("INSERT INTO #resilience_test VALUES (1)", |_, _| {})
        .expect("insert failed");

    let result = conn.execute_query("INSERT INTO #resilience_test VALUES (1)", |_, _| {});
    assert!(result.is_err(), "duplicate key insert should fail");

    let mut count = 0;
    conn.execute_query("SELECT COUNT(*) AS n FROM #resilience_test", |_, row| {
        count = int_field(row, 0).unwrap_or(0);
    })
    .expect("connection should still be usable");
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires SQL Server"]
fn cancel_acknowledges_and_leaves_connection_usable() {
    let config = get_test_config().expect("SQL Server config required");
    let mut conn = Connection::connect(config).expect("failed to connect");

    // There is no background reader thread, so a real in-flight cancel
    // requires a second connection driving the query on another thread;
    // this just exercises the ack path against an idle connection.
    let outcome = conn.cancel().expect("cancel should be acknowledged");
    assert_eq!(outcome, mssql_driver::CancelOutcome::Acknowledged);

    let mut ok = false;
    conn.execute_query("SELECT 1", |_, _| ok = true)
        .expect("connection should still be usable after cancel");
    assert!(ok);
}
