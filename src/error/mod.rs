//! This module contains the primary error type for the library's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.
//!
//! The algebra itself is total and never signals an error: division by zero,
//! out-of-range shifts, and reads past the end of a buffer all have defined
//! zero results. The only failable surface is decoding serialized terms.

pub mod codec;

use thiserror::Error;

/// The interface result type for the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface should be members of this
/// enum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Errors that come from decoding serialized terms.
    #[error(transparent)]
    Codec(#[from] codec::Error),
}
