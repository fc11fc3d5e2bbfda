use thiserror::Error;

/// An error returned when a value cannot be created from a type record.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConstructError {
    /// The type has no default value, or no values at all.
    #[error("`{0}` cannot be default constructed")]
    NotConstructible(&'static str),
    /// The type cannot be cloned.
    #[error("`{0}` cannot be copy constructed")]
    NotCopyable(&'static str),
    /// The type has no values that could be moved.
    #[error("`{0}` cannot be move constructed")]
    NotMovable(&'static str),
    /// The allocator returned null.
    #[error("allocating {size} bytes for `{type_name}` failed")]
    AllocFailed {
        type_name: &'static str,
        size: usize,
    },
}

/// An error returned by the checked accessors of a
/// [`DataObject`](crate::data::DataObject).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    /// The object holds no value.
    #[error("the data object is null")]
    Null,
    /// The held value is not of the requested type.
    #[error("`{found}` cannot be accessed as `{expected}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Mutable access was requested to a const value.
    #[error("`{0}` is read-only")]
    ReadOnly(&'static str),
    /// Exclusive access was requested while other handles exist.
    #[error("the data object is shared by {0} handles")]
    Shared(usize),
}
