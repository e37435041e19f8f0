//! Shortest round-trip float text (zmij), with ZPL spellings for NaN and infinities.

use std::fmt::Write;

use num_traits::float::FloatCore;
use zmij::Float;

use crate::ser;

/// Write `f` so that parsing the text back yields the same value.
pub(crate) fn write_float_string<F: Float + FloatCore, W: Write>(target: &mut W, f: F) -> ser::Result<()> {
    if f.is_nan() {
        target.write_str("NaN")?;
    } else if f.is_infinite() {
        target.write_str(if f.is_sign_positive() { "+Inf" } else { "-Inf" })?;
    } else {
        let mut buf = zmij::Buffer::new();
        // NaN and infinities are handled above
        target.write_str(buf.format_finite(f))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: Float + FloatCore>(f: F) -> String {
        let mut out = String::new();
        write_float_string(&mut out, f).unwrap();
        out
    }

    #[test]
    fn special_values() {
        assert_eq!(render(f64::NAN), "NaN");
        assert_eq!(render(f64::INFINITY), "+Inf");
        assert_eq!(render(f32::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn finite_values_parse_back() {
        for v in [0.1f64, -2.5, 1e-7, 123456789.125, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(render(v).parse::<f64>().unwrap(), v);
        }
        assert_eq!(render(0.1f32).parse::<f32>().unwrap(), 0.1f32);
    }
}
