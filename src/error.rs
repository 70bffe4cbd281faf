//! Error taxonomy shared across the state-model crate.

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the state model to its callers.
///
/// Every fallible operation in this crate returns one of these variants
/// rather than panicking, except for precondition violations that the spec
/// calls out as programmer errors (e.g. indexing a non-empty stack out of
/// bounds).
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// A constructor was given more components than the type permits.
    #[error("too many arguments: {0}")]
    TooManyArguments(String),

    /// A big-integer to fixed-width conversion exceeded the range.
    #[error("value overflows the target width")]
    Overflow,

    /// A big-integer to unsigned conversion was given a negative value.
    #[error("negative value cannot be represented")]
    NegativeInput,

    /// Text/JSON/hex input failed the documented grammar.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// `Code::get_operation` called on a data byte, or `Code::get_data`
    /// called on a code byte.
    #[error("invalid code position")]
    InvalidPosition,

    /// A revision helper was called with a value outside the enumerated set.
    #[error("unknown revision")]
    UnknownRevision,

    /// An index or slice fell outside the bounds of a fixed-size container.
    #[error("index out of bounds")]
    OutOfBounds,

    /// Stack push beyond the 1024-item limit.
    #[error("stack overflow")]
    StackOverflow,

    /// Pop/get on an empty or too-shallow stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// Memory expansion requested beyond `MaxMemoryExpansionSize`.
    #[error("memory capacity exceeded")]
    MemoryCapacityExceeded,

    /// File I/O failure during serialization.
    #[error("I/O failure: {0}")]
    IoFailure(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IoFailure(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}
