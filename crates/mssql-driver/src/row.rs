//! Row and column metadata surfaced to a query's row callback.
//!
//! The wire-level shapes already live in `tds_protocol::token` — a `Row` is
//! an ordered `Vec<RowField>`, one per column named by the most recent
//! `COLMETADATA`. This module re-exports them under the driver's public
//! vocabulary and adds the small amount of convenience access a caller
//! needs (by-index field lookup, null check) without introducing a
//! typed-value conversion layer: decoding field bytes into Rust types is out
//! of scope (no `FromSql`/derive-macro row mapping here).

pub use tds_protocol::token::{ColMetaData, ColumnData as Column, Row, RowField};

/// Convenience accessors on [`Row`] beyond the plain `fields: Vec<RowField>`.
pub trait RowExt {
    /// The field at `index`, if the row has that many columns.
    fn field(&self, index: usize) -> Option<&RowField>;

    /// Number of fields in the row.
    fn len(&self) -> usize;

    /// Whether the row has no fields (a zero-column result set).
    fn is_empty(&self) -> bool;
}

impl RowExt for Row {
    fn field(&self, index: usize) -> Option<&RowField> {
        self.fields.get(index)
    }

    fn len(&self) -> usize {
        self.fields.len()
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl RowField {
    /// The field's raw bytes, or `None` if the field is SQL `NULL`.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if self.is_null { None } else { Some(&self.data) }
    }
}
