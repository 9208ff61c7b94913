//! Error types for range-compressed lists and dictionaries.

use thiserror::Error;

/// Error variants for range list, dictionary, view and combinator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An id (or slice bound) lies outside `[0, size)`.
    #[error("index {index} is out of range for size {size}")]
    IndexOutOfRange {
        /// The offending id or bound.
        index: usize,
        /// The fixed size of the structure.
        size: usize,
    },

    /// An id was supplied that is not a non-negative integer.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A scalar read found more than one distinct value.
    #[error("multiple values found{}: {first} and {second}", key_suffix(.key))]
    MultipleValues {
        /// The dictionary key of the list, if it has one.
        key: Option<String>,
        /// The first value seen.
        first: String,
        /// A value that differs from `first`.
        second: String,
    },

    /// The dictionary has no list under this key.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Two lists that must share a size do not.
    #[error("size mismatch: expected {expected}, found {found}")]
    SizeMismatch {
        /// The required size.
        expected: usize,
        /// The size that was supplied.
        found: usize,
    },

    /// A selector or subscript that cannot be used for this operation.
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// A scalar read over a selection containing no ids.
    #[error("selection is empty")]
    EmptySelection,

    /// `reset` was called on a list with no registered default.
    #[error("no default value registered{}", key_suffix(.0))]
    NoDefault(Option<String>),

    /// A scalar division or floor division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A shared list is already borrowed in a conflicting way.
    #[error("list is already borrowed{}", key_suffix(.0))]
    Borrowed(Option<String>),
}

impl Error {
    /// Build a [`Error::MultipleValues`] from two conflicting values.
    pub(crate) fn multiple_values<T: std::fmt::Debug>(
        key: Option<String>,
        first: &T,
        second: &T,
    ) -> Self {
        Error::MultipleValues {
            key,
            first: format!("{first:?}"),
            second: format!("{second:?}"),
        }
    }
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for key {key}"),
        None => String::new(),
    }
}

/// A specialized Result type for range operations.
pub type Result<T> = std::result::Result<T, Error>;
