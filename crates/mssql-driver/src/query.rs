//! SQL batch text.

/// A SQL text batch to send via `SQL_BATCH`.
///
/// There is no prepared-statement/RPC path and no parameter binding here —
/// both are out of scope (only SQL text batches are supported). Build the
/// SQL text yourself and pass it to [`crate::client::Connection::execute_query`].
#[derive(Debug, Clone)]
pub struct Query {
    sql: String,
}

impl Query {
    /// Wrap SQL text as a batch.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// The SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl From<&str> for Query {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Query {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_sql_text() {
        let query = Query::new("SELECT * FROM users");
        assert_eq!(query.sql(), "SELECT * FROM users");
    }

    #[test]
    fn converts_from_str_and_string() {
        let a: Query = "SELECT 1".into();
        let b: Query = String::from("SELECT 2").into();
        assert_eq!(a.sql(), "SELECT 1");
        assert_eq!(b.sql(), "SELECT 2");
    }
}
