//! Error types for Region Lattice.

/// The error returned by fallible region operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LatticeError {
    /// Region-related error.
    #[error("Region error: {0}")]
    Region(#[from] RegionError),
    /// Signal-related error.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Errors produced by region mutations.
///
/// These are validation failures, never structural corruption: a failed
/// operation leaves the hierarchy exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// Region names must not be empty.
    #[error("Region name must not be empty")]
    EmptyName,
    /// The name contains a character reserved for region paths.
    #[error("Invalid region name '{0}': '/' is reserved as the path separator")]
    InvalidName(String),
    /// A sibling already uses the requested name.
    #[error("A sibling region is already named '{0}'")]
    DuplicateName(String),
    /// The root region has no parent to be removed from.
    #[error("The root region cannot be removed")]
    RootRemoval,
}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID")]
    InvalidConnection,
}

/// Result of a fallible region operation.
pub type Result<T> = std::result::Result<T, LatticeError>;
