//! Defines decode error and its location
use std::fmt;

use serde::de::{self};

/// Line location within the source ZPL document (1-indexed).
///
/// ZPL is strictly line oriented, so a line number is all the position
/// information a diagnostic needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// 1-indexed physical line number in the input stream.
    pub(crate) line: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time.
    pub const UNKNOWN: Self = Self { line: 0 };

    /// Create a new location record for a 1-indexed line.
    pub(crate) const fn new(line: usize) -> Self {
        // Error reporting only: documents over 4G lines saturate.
        let line = if line > u32::MAX as usize { u32::MAX } else { line as u32 };
        Self { line }
    }

    /// 1-indexed line number, 0 if unknown.
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// Whether this location points at an actual line.
    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

/// Error type compatible with `serde::de::Error`.
#[derive(Debug)]
pub enum Error {
    /// A line matches no grammar rule (bad indentation, bad key, missing value...).
    Syntax {
        msg: String,
        location: Location,
    },
    /// The decode target is neither a struct nor a string-keyed map.
    InvalidTarget {
        target: String,
    },
    /// A key does not resolve to any declared field and the record has no `*` field.
    UnknownField {
        field: String,
        record: &'static str,
        location: Location,
    },
    /// A value cannot be coerced into the slot type, or the slot holds
    /// an incompatible shape (a section where a value is expected and vice versa).
    Type {
        msg: String,
        location: Location,
    },
    /// A section was opened on a dynamic-mapping key that already holds a property.
    TypeConflict {
        name: String,
        location: Location,
    },
    /// A [`crate::Section`] accessor did not find the requested key.
    NotFound {
        name: String,
    },
    /// A single-value [`crate::Section`] accessor found a repeated property.
    MultipleValues {
        name: String,
        count: usize,
        location: Location,
    },
    /// A key or value that a [`crate::Section`] cannot hold because it could
    /// not be written back as ZPL.
    InvalidEntry {
        name: String,
        msg: &'static str,
    },
    /// Free-form error with optional source location.
    Message {
        msg: String,
        location: Location,
    },
    /// The event stream closed more sections than it opened.
    Usage {
        msg: &'static str,
    },
    /// Unexpected I/O error. This may happen only when deserializing from a reader.
    IOError {
        cause: std::io::Error,
    },
}

impl Error {
    /// Construct a `Message` error with no known location.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct a syntax error for the given line.
    pub(crate) fn syntax<S: Into<String>>(s: S, location: Location) -> Self {
        Error::Syntax {
            msg: s.into(),
            location,
        }
    }

    /// Construct a type error with no known location.
    pub(crate) fn type_error<S: Into<String>>(s: S) -> Self {
        Error::Type {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an invalid-target error naming the rejected Rust type.
    pub(crate) fn invalid_target<S: Into<String>>(target: S) -> Self {
        Error::InvalidTarget {
            target: target.into(),
        }
    }

    /// Attach/override a concrete location to this error and return it.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Syntax { location, .. }
            | Error::UnknownField { location, .. }
            | Error::Type { location, .. }
            | Error::TypeConflict { location, .. }
            | Error::MultipleValues { location, .. }
            | Error::Message { location, .. } => {
                *location = set_location;
            }
            Error::InvalidTarget { .. }
            | Error::NotFound { .. }
            | Error::InvalidEntry { .. }
            | Error::Usage { .. }
            | Error::IOError { .. } => {} // these errors do not support location
        }
        self
    }

    /// Attach a location only if the error does not carry one yet.
    ///
    /// Errors raised by serde-generated visitors (missing fields, invalid
    /// lengths) arrive without position; the node being decoded supplies it.
    pub(crate) fn with_default_location(self, location: Location) -> Self {
        if self.location().is_none() {
            self.with_location(location)
        } else {
            self
        }
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Syntax { location, .. }
            | Error::UnknownField { location, .. }
            | Error::Type { location, .. }
            | Error::TypeConflict { location, .. }
            | Error::MultipleValues { location, .. }
            | Error::Message { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::InvalidTarget { .. }
            | Error::NotFound { .. }
            | Error::InvalidEntry { .. }
            | Error::Usage { .. }
            | Error::IOError { .. } => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax { msg, location } => {
                fmt_with_location(f, &format!("syntax error: {msg}"), location)
            }
            Error::InvalidTarget { target } => write!(
                f,
                "cannot decode ZPL into {target}: the target must be a struct or a string-keyed map"
            ),
            Error::UnknownField {
                field,
                record,
                location,
            } => fmt_with_location(f, &format!("unknown field `{field}` in {record}"), location),
            Error::Type { msg, location } => fmt_with_location(f, msg, location),
            Error::TypeConflict { name, location } => fmt_with_location(
                f,
                &format!("cannot open section `{name}`: the key already holds a property"),
                location,
            ),
            Error::NotFound { name } => write!(f, "key `{name}` not found"),
            Error::MultipleValues { name, count, location } => fmt_with_location(
                f,
                &format!("expected exactly one value for `{name}`, found {count}"),
                location,
            ),
            Error::InvalidEntry { name, msg } => write!(f, "cannot store `{name}`: {msg}"),
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::Usage { msg } => write!(f, "usage error: {msg}"),
            Error::IOError { cause } => write!(f, "IO error: {}", cause),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            _ => None,
        }
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::msg(msg.to_string())
    }

    fn invalid_type(unexp: de::Unexpected, exp: &dyn de::Expected) -> Self {
        Error::type_error(format!("invalid type: {unexp}, expected {exp}"))
    }

    fn invalid_value(unexp: de::Unexpected, exp: &dyn de::Expected) -> Self {
        Error::type_error(format!("invalid value: {unexp}, expected {exp}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::IOError { cause }
    }
}

/// Print a message optionally suffixed with "at line X".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_known() {
        write!(f, "{msg} at line {}", location.line)
    } else {
        write!(f, "{msg}")
    }
}
