mod oid;

use thiserror::Error;

pub use self::oid::ObjectIdErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while generating BSON.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The field name associated with the error, if any.
    pub key: Option<String>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur while generating BSON.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A write call arrived in an order the document structure does not allow.
    #[error("Protocol violation: {message}")]
    #[non_exhaustive]
    ProtocolViolation { message: String },

    /// The configured character escapes flag a character without supplying its substitute.
    #[error(
        "Invalid custom escape definitions; custom escape not found for character {character:?}, \
         although was supposed to have one"
    )]
    #[non_exhaustive]
    EscapeConfiguration { character: char },

    /// A string that must be written as a cstring contains an interior null byte.
    #[error("cstring with interior null: {0:?}")]
    InvalidCString(String),

    /// Bytes handed over as a UTF-8 string were not valid UTF-8.
    #[error("Invalid UTF-8")]
    InvalidUtf8,

    /// A length does not fit the signed 32-bit field BSON stores it in.
    #[error("length {length} exceeds the maximum BSON size")]
    #[non_exhaustive]
    LengthOverflow { length: usize },

    /// A length field was due to be backpatched after its bytes had already been flushed.
    #[error("cannot backpatch offset {offset}: the bytes were already flushed to the sink")]
    #[non_exhaustive]
    FlushedRegion { offset: usize },

    /// A hex string could not be parsed into an [`ObjectId`](crate::oid::ObjectId).
    #[error("Invalid ObjectId: {kind}")]
    #[non_exhaustive]
    ObjectId { kind: ObjectIdErrorKind },

    /// A [`std::io::Error`] occurred in the underlying sink.
    #[error("An IO error occurred: {0}")]
    Io(std::io::Error),

    /// A general error raised by a [`serde::Serialize`] implementation.
    #[cfg(feature = "serde")]
    #[error("{message}")]
    #[non_exhaustive]
    SerializationError { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, key: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        ErrorKind::Io(value).into()
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ErrorKind::SerializationError {
            message: msg.to_string(),
        }
        .into()
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn protocol_violation(message: impl ToString) -> Self {
        ErrorKind::ProtocolViolation {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn escape_configuration(character: char) -> Self {
        ErrorKind::EscapeConfiguration { character }.into()
    }

    pub(crate) fn length_overflow(length: usize) -> Self {
        ErrorKind::LengthOverflow { length }.into()
    }

    pub(crate) fn flushed_region(offset: usize) -> Self {
        ErrorKind::FlushedRegion { offset }.into()
    }

    /// Whether this error came from the underlying sink.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io(_))
    }

    /// Whether this error was caused by an out-of-order write call.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self.kind, ErrorKind::ProtocolViolation { .. })
    }
}
