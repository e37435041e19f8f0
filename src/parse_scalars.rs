use std::num::IntErrorKind;

use crate::error::{Error, Location};

/// Parse a ZPL boolean.
///
/// Accepted TRUE literals: `1`, `t`, `T`, `TRUE`, `true`, `True`.
/// Accepted FALSE literals: `0`, `f`, `F`, `FALSE`, `false`, `False`.
///
/// With `strict`, only `1`, `0`, `true` and `false` are recognized.
/// The value is matched as is: surrounding whitespace (possible with quoted
/// values) makes it invalid.
pub(crate) fn parse_bool(s: &str, strict: bool) -> Result<bool, String> {
    let parsed = if strict {
        match s {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    } else {
        match s {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        }
    };
    parsed.ok_or_else(|| format!("invalid bool `{s}`"))
}

fn int_error(s: &str, ty: &'static str, kind: &IntErrorKind, location: Location) -> Error {
    let msg = match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            format!("value `{s}` is out of range for {ty}")
        }
        _ => format!("invalid {ty} `{s}`"),
    };
    Error::type_error(msg).with_location(location)
}

/// Parse a base-10 signed integer and narrow it to `T`.
pub(crate) fn parse_int_signed<T>(s: &str, ty: &'static str, location: Location) -> Result<T, Error>
where
    T: TryFrom<i128>,
{
    let wide = s
        .parse::<i128>()
        .map_err(|e| int_error(s, ty, e.kind(), location))?;
    T::try_from(wide).map_err(|_| int_error(s, ty, &IntErrorKind::PosOverflow, location))
}

/// Parse a base-10 unsigned integer and narrow it to `T`.
pub(crate) fn parse_int_unsigned<T>(s: &str, ty: &'static str, location: Location) -> Result<T, Error>
where
    T: TryFrom<u128>,
{
    if s.starts_with('-') {
        // A negative number never fits, "-0" included, mirroring signed overflow.
        return Err(int_error(s, ty, &IntErrorKind::InvalidDigit, location));
    }
    let wide = s
        .parse::<u128>()
        .map_err(|e| int_error(s, ty, e.kind(), location))?;
    T::try_from(wide).map_err(|_| int_error(s, ty, &IntErrorKind::PosOverflow, location))
}

/// Whether the text spells an infinity rather than overflowing into one.
fn names_infinity(s: &str) -> bool {
    s.trim_start_matches(['+', '-']).eq_ignore_ascii_case("inf")
        || s.trim_start_matches(['+', '-']).eq_ignore_ascii_case("infinity")
}

pub(crate) fn parse_f64(s: &str, location: Location) -> Result<f64, Error> {
    let v = s
        .parse::<f64>()
        .map_err(|_| Error::type_error(format!("invalid f64 `{s}`")).with_location(location))?;
    if v.is_infinite() && !names_infinity(s) {
        return Err(Error::type_error(format!("value `{s}` is out of range for f64")).with_location(location));
    }
    Ok(v)
}

pub(crate) fn parse_f32(s: &str, location: Location) -> Result<f32, Error> {
    let v = s
        .parse::<f32>()
        .map_err(|_| Error::type_error(format!("invalid f32 `{s}`")).with_location(location))?;
    if v.is_infinite() && !names_infinity(s) {
        return Err(Error::type_error(format!("value `{s}` is out of range for f32")).with_location(location));
    }
    Ok(v)
}
