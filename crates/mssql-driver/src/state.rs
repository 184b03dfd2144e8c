//! Runtime connection state.
//!
//! A connection moves through a small state machine:
//!
//! ```text
//! Disconnected -> (connect) -> Connected -> (LOGINACK observed) -> Authenticated
//! Authenticated -> (DONE(final) of a query, error, or disconnect) -> {Authenticated|Disconnected}
//! ```
//!
//! There is no compile-time type-state here — no transaction or streaming
//! states need enforcing at the type level — so a plain runtime enum is
//! enough.

/// The connection's current position in the TDS session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No TCP connection has been established yet.
    Disconnected,
    /// TCP connection is open but LOGIN7 has not yet been acknowledged.
    Connected,
    /// LOGINACK was observed; the session can execute queries.
    Authenticated,
    /// A protocol or capacity error left the session unusable; only
    /// dropping the connection can recover.
    Poisoned,
}

impl ConnectionState {
    /// Whether queries may be executed in this state.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Whether the connection can still be used at all.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Poisoned | Self::Disconnected)
    }
}
