use hex::FromHexError;
use thiserror::Error as ThisError;

use crate::error::{Error, ErrorKind};

/// Why a hex string could not be parsed into an [`ObjectId`](crate::oid::ObjectId).
#[derive(Clone, Debug, ThisError)]
#[non_exhaustive]
pub enum ObjectIdErrorKind {
    /// A character outside `0-9`, `a-f` and `A-F` was found.
    #[error("invalid character '{c}' encountered at index {index}")]
    #[non_exhaustive]
    InvalidHexStringCharacter { c: char, index: usize },

    /// The string does not encode exactly twelve bytes.
    #[error("invalid hex string length {length}, expected 24 characters")]
    #[non_exhaustive]
    InvalidHexStringLength { length: usize },
}

impl Error {
    pub(crate) fn from_hex_error(error: FromHexError, length: usize) -> Self {
        let kind = match error {
            FromHexError::InvalidHexCharacter { c, index } => {
                ObjectIdErrorKind::InvalidHexStringCharacter { c, index }
            }
            FromHexError::InvalidStringLength | FromHexError::OddLength => {
                ObjectIdErrorKind::InvalidHexStringLength { length }
            }
        };
        ErrorKind::ObjectId { kind }.into()
    }
}
