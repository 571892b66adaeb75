//! Error types for the cowtree crate

use thiserror::Error;

/// Result type alias using `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported when building a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Branching factor too small to keep non-root nodes non-empty
    #[error("invalid degree {degree}: must be at least {min}", min = crate::options::MIN_DEGREE)]
    InvalidDegree { degree: usize },
}

/// Returned by [`CowTree::try_insert`](crate::CowTree::try_insert) when the
/// key is already present. Carries the rejected pair back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupied<K, V> {
    pub key: K,
    pub value: V,
}
