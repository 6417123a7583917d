//! Magnitudes printed by the simulator carry an optional single-letter SI
//! suffix, e.g. `12.6757u` or `650.00000m`.
//!
//! `reda_unit::Number` reads the common suffixes. SPICE listings also use a
//! few it does not know, and read an uppercase `M` as milli where it reads mega.

use reda_unit::Number;

#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("empty magnitude token")]
    Empty,

    #[error("parse value '{0}' failed: {1}")]
    ParseValue(String, String),
}

/// Scale of a suffix that SPICE reads differently from `reda_unit`
pub fn spice_suffix_scale(suffix: char) -> Option<f64> {
    match suffix {
        'a' | 'A' => Some(1e-18),
        'f' | 'F' => Some(1e-15),
        'M' => Some(1e-3),
        'x' | 'X' => Some(1e6),
        'g' => Some(1e9),
        _ => None,
    }
}

/// Parse a token such as `3.5p` into base SI units.
pub fn parse_magnitude(token: &str) -> Result<f64, UnitError> {
    let token = token.trim();
    let last = token.chars().last().ok_or(UnitError::Empty)?;

    let (number, scale) = match spice_suffix_scale(last) {
        Some(scale) => (&token[..token.len() - last.len_utf8()], scale),
        None => (token, 1.0),
    };

    let number: Number = number
        .parse()
        .map_err(|e| UnitError::ParseValue(token.to_string(), e))?;

    Ok(number.to_f64() * scale)
}
