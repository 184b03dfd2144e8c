//! Benchmarks for driver-level building blocks: config construction and the
//! token-dispatch path a result set is decoded through.

#![allow(clippy::unwrap_used, missing_docs)]

use bytes::{BufMut, Bytes, BytesMut};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use mssql_driver::Config;
use tds_protocol::token::{Done, DispatchedToken, DoneStatus, TokenDispatch, TokenType};

/// Benchmark building a [`Config`] through the full builder chain and
/// converting it to a [`tds_protocol::Login7`].
fn bench_config_to_login7(c: &mut Criterion) {
    c.bench_function("config_builder_to_login7", |b| {
        b.iter(|| {
            let config = Config::new(
                black_box("sqlserver.internal"),
                black_box("app_user"),
                black_box("hunter2"),
            )
            .database("analytics")
            .application_name("bench-harness")
            .packet_size(4096);
            black_box(config.to_login7())
        })
    });
}

fn write_utf16le(buf: &mut BytesMut, s: &str) {
    for unit in s.encode_utf16() {
        buf.put_u16_le(unit);
    }
}

/// Build a COLMETADATA token for a row of `width` `INT` columns followed by
/// `row_count` ROW tokens and a trailing DONE, as a single PDU payload.
fn int_result_set(width: usize, row_count: usize) -> Bytes {
    let mut buf = BytesMut::new();

    buf.put_u8(TokenType::ColMetaData as u8);
    buf.put_u16_le(width as u16);
    for i in 0..width {
        buf.put_u16_le(0); // user_type
        buf.put_u16_le(0); // flags
        buf.put_u8(0x38); // IntN fixed-width 4-byte int
        let name = format!("col{i}");
        buf.put_u8(name.encode_utf16().count() as u8);
        write_utf16le(&mut buf, &name);
    }

    for row in 0..row_count {
        buf.put_u8(TokenType::Row as u8);
        for col in 0..width {
            buf.put_i32_le((row * width + col) as i32);
        }
    }

    Done {
        status: DoneStatus { count: true, ..DoneStatus::default() },
        cur_cmd: 0,
        row_count: row_count as u32,
    }
    .encode(&mut buf);

    buf.freeze()
}

/// Benchmark feeding a full result-set PDU through [`TokenDispatch`], the
/// same stateful path [`mssql_driver::Connection::execute_query`] drives one
/// PDU at a time.
fn bench_token_dispatch_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_dispatch_feed");

    for &(width, rows) in &[(4usize, 100usize), (4, 1000), (16, 1000)] {
        let payload = int_result_set(width, rows);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_function(format!("{width}cols_x_{rows}rows"), |b| {
            b.iter(|| {
                let mut dispatch = TokenDispatch::new();
                let mut decoded_rows = 0usize;
                dispatch
                    .feed(payload.clone(), |token| {
                        if let DispatchedToken::Row(row) = token {
                            decoded_rows += 1;
                            black_box(row);
                        }
                    })
                    .expect("unexpected decode error");
                black_box(decoded_rows)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_config_to_login7, bench_token_dispatch_feed);
criterion_main!(benches);
