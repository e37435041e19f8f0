use std::{fmt, io};

/// Error type used by the ZPL serializer.
///
/// This type is re-exported as `serde_zpl::ser::Error` and is returned by
/// the public serialization APIs (for example `serde_zpl::to_string`).
///
/// It implements `serde::ser::Error`, which allows user `Serialize` impls and
/// Serde derives to report failures via `S::Error::custom(...)`. Such
/// free-form messages are stored in the `Message` variant.
///
/// Output already written when an error occurs stays written; the
/// serializer does not roll back.
#[derive(Debug)]
pub enum Error {
    /// Free-form error.
    Message { msg: String },
    /// Wrapper for formatting errors.
    Format { error: fmt::Error },
    /// Wrapper for I/O errors.
    IO { error: io::Error },
    /// A field or map key that cannot be written as a ZPL key.
    InvalidKey { key: String },
    /// A value that cannot be written on a single ZPL line.
    InvalidValue { key: String, msg: String },
    /// The top-level value is not a struct or a map.
    InvalidRoot { kind: &'static str },
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message {
            msg: msg.to_string(),
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(error: fmt::Error) -> Self {
        Error::Format { error }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::IO { error }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg } => f.write_str(msg),
            Error::Format { error } => write!(f, "formatting error: {error}"),
            Error::IO { error } => write!(f, "I/O error: {error}"),
            Error::InvalidKey { key } => write!(
                f,
                "invalid ZPL key `{key}`: keys are letters, digits and `/`, starting with a letter or digit"
            ),
            Error::InvalidValue { key, msg } => write!(f, "invalid value for `{key}`: {msg}"),
            Error::InvalidRoot { kind } => {
                write!(f, "cannot encode {kind} as a ZPL document: the root must be a struct or a map")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Format { error } => Some(error),
            Error::IO { error } => Some(error),
            Error::Message { .. }
            | Error::InvalidKey { .. }
            | Error::InvalidValue { .. }
            | Error::InvalidRoot { .. } => None,
        }
    }
}
