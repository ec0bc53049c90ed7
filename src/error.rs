//! Unified error type.

use std::io;

/// The error type returned by fallible setup operations.
///
/// Nothing on the request path produces an `Error`: a request the guard
/// cannot reason about is passed through untouched. This type surfaces
/// startup failures only: bad configuration, binding to a port, accepting
/// a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// A configured canonical host is not a bare `host[:port]` authority.
    #[error("invalid canonical host `{0}`")]
    InvalidHost(String),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),
}
