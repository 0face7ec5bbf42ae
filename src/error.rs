use thiserror::Error;

/// Errors raised while configuring a [`Cache`](crate::Cache).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A cache must be able to hold at least one unit of size.
    #[error("cache capacity must be greater than 0")]
    ZeroCapacity,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
