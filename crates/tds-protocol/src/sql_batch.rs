//! SQL batch request encoding.
//!
//! This module provides encoding for SQL batch requests (packet type 0x01).
//! A plain TDS 7.1 SQL batch carries no ALL_HEADERS section (that is a TDS
//! 7.2+ addition for MARS/transaction descriptor propagation, out of scope
//! here): the payload is just the SQL text, encoded as UTF-16LE.

use bytes::Bytes;

use crate::codec::write_utf16_string;

/// Encode a SQL batch request.
///
/// Returns the encoded payload (without the 8-byte PDU header): the SQL
/// text, UTF-16LE encoded, with no preamble.
///
/// # Example
///
/// ```
/// use tds_protocol::sql_batch::encode_sql_batch;
///
/// let sql = "SELECT * FROM FOO;";
/// let payload = encode_sql_batch(sql);
/// assert_eq!(payload.len(), sql.chars().count() * 2);
/// ```
#[must_use]
pub fn encode_sql_batch(sql: &str) -> Bytes {
    let mut buf = bytes::BytesMut::with_capacity(sql.len() * 2);
    write_utf16_string(&mut buf, sql);
    buf.freeze()
}

/// SQL batch builder.
#[derive(Debug, Clone)]
pub struct SqlBatch {
    sql: String,
}

impl SqlBatch {
    /// Create a new SQL batch.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// Get the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Encode the SQL batch to bytes.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        encode_sql_batch(&self.sql)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sql_batch_select_foo() {
        let sql = "SELECT * FROM FOO;";
        let payload = encode_sql_batch(sql);

        // 18 chars * 2 bytes = 36 bytes; with the 8-byte PDU header this
        // yields the 44-byte packet documented for this fixture.
        assert_eq!(payload.len(), 36);
        assert_eq!(payload[0], b'S');
        assert_eq!(payload[1], 0);
        assert_eq!(payload[2], b'E');
        assert_eq!(payload[3], 0);
    }

    #[test]
    fn test_sql_batch_builder() {
        let batch = SqlBatch::new("SELECT @@VERSION");
        assert_eq!(batch.sql(), "SELECT @@VERSION");

        let payload = batch.encode();
        assert_eq!(payload.len(), "SELECT @@VERSION".len() * 2);
    }

    #[test]
    fn test_empty_batch() {
        let payload = encode_sql_batch("");
        assert_eq!(payload.len(), 0);
    }
}
