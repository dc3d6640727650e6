//! This module contains errors pertaining to the decoding of serialized
//! terms.

use thiserror::Error;

/// Errors that occur while decoding a serialized term in
/// [`crate::codec`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Input ended after {available:?} bytes where {requested:?} more were needed")]
    UnexpectedEndOfInput { requested: usize, available: usize },

    #[error("The tag {tag:#04x} does not encode any {sort} variant")]
    UnknownTag { tag: u8, sort: &'static str },

    #[error("A name in the input is not valid UTF-8")]
    InvalidName,

    #[error("The input continues for {remaining:?} bytes past the end of the term")]
    TrailingBytes { remaining: usize },

    #[error("A length prefix of {length:?} bytes exceeds the remaining input")]
    LengthOutOfBounds { length: usize },
}

/// The result type for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;
