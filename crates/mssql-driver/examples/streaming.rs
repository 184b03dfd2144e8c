//! Processing large result sets without buffering them example.
//!
//! `execute_query` never materializes a full result set in memory: each
//! `ROW` token is handed to the callback as soon as it is decoded, and the
//! row's bytes are dropped once the callback returns. This example
//! exercises that with a 10,000-row CTE and a single-pass aggregation.
//!
//! # Running
//!
//! ```bash
//! cargo run --example streaming
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::time::Instant;

use mssql_driver::row::RowExt;
use mssql_driver::{Config, Connection, DriverError};

fn main() -> Result<(), DriverError> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("MSSQL_HOST").unwrap_or_else(|_| "localhost".into());
    let database = std::env::var("MSSQL_DATABASE").unwrap_or_else(|_| "master".into());
    let user = std::env::var("MSSQL_USER").unwrap_or_else(|_| "sa".into());
    let password = std::env::var("MSSQL_PASSWORD").unwrap_or_else(|_| "Password123!".into());

    let config = Config::new(&host, user, password).database(database);
    let mut conn = Connection::connect(config)?;
    println!("Connected to SQL Server");

    println!("\n=== Processing a large result set row-by-row ===");
    large_result_set_example(&mut conn)?;

    println!("\n=== Single-pass aggregation ===");
    aggregation_example(&mut conn)?;

    println!("\nDone!");
    Ok(())
}

fn large_result_set_example(conn: &mut Connection) -> Result<(), DriverError> {
    let query = r#"
        WITH Numbers AS (
            SELECT 1 AS n
            UNION ALL
            SELECT n + 1 FROM Numbers WHERE n < 10000
        )
        SELECT n FROM Numbers
        OPTION (MAXRECURSION 10000)
    "#;

    println!("Executing query that returns 10,000 rows...");
    let start = Instant::now();

    let mut count: i64 = 0;
    let mut sum: i64 = 0;
    conn.execute_query(query, |_columns, row| {
        if let Some(bytes) = row.field(0).and_then(|f| f.as_bytes()) {
            if bytes.len() == 4 {
                let n = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                sum += i64::from(n);
                count += 1;
            }
        }
    })?;

    println!("Processed {count} rows in {:?}", start.elapsed());
    println!("sum = {sum}, expected = {}", (10_000 * 10_001) / 2);
    Ok(())
}

fn aggregation_example(conn: &mut Connection) -> Result<(), DriverError> {
    let query = r#"
        WITH Data AS (
            SELECT 1 AS category, ABS(CHECKSUM(NEWID())) % 100 AS value
            UNION ALL
            SELECT category + 1, ABS(CHECKSUM(NEWID())) % 100
            FROM Data WHERE category < 1000
        )
        SELECT category % 10 AS group_id, value
        FROM Data
        OPTION (MAXRECURSION 1000)
    "#;

    println!("Aggregating 1,000 rows into 10 groups...");

    let mut groups: HashMap<i32, (i64, i32)> = HashMap::new();
    conn.execute_query(query, |_columns, row| {
        let group_id = row
            .field(0)
            .and_then(|f| f.as_bytes())
            .filter(|b| b.len() == 4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]));
        let value = row
            .field(1)
            .and_then(|f| f.as_bytes())
            .filter(|b| b.len() == 4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]));

        if let (Some(group_id), Some(value)) = (group_id, value) {
            let entry = groups.entry(group_id).or_insert((0, 0));
            entry.0 += i64::from(value);
            entry.1 += 1;
        }
    })?;

    println!("\n{:>8} {:>10} {:>8} {:>10}", "Group", "Sum", "Count", "Average");
    println!("{}", "-".repeat(40));

    let mut group_ids: Vec<_> = groups.keys().copied().collect();
    group_ids.sort_unstable();
    for group_id in group_ids {
        let (sum, count) = groups[&group_id];
        let avg = sum as f64 / f64::from(count);
        println!("{group_id:>8} {sum:>10} {count:>8} {avg:>10.2}");
    }

    Ok(())
}
