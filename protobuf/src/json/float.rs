//! Special-value tokens for the JSON float mapping.

pub const JSON_INF: &str = "Infinity";
pub const JSON_MINUS_INF: &str = "-Infinity";
pub const JSON_NAN: &str = "NaN";

/// Renders `v` the way `to_json` does: finite values as their shortest
/// round-tripping decimal, non-finite values as the special string tokens.
pub fn format_f64(v: f64) -> String {
    if v.is_nan() {
        format!("\"{}\"", JSON_NAN)
    } else if v.is_infinite() {
        format!("\"{}\"", if v > 0.0 { JSON_INF } else { JSON_MINUS_INF })
    } else {
        format!("{}", v)
    }
}

pub fn format_f32(v: f32) -> String {
    if v.is_nan() {
        format!("\"{}\"", JSON_NAN)
    } else if v.is_infinite() {
        format!("\"{}\"", if v > 0.0 { JSON_INF } else { JSON_MINUS_INF })
    } else {
        format!("{}", v)
    }
}

/// Parses a bare (unquoted) or special-token (quoted) float.
pub fn parse_f64(s: &str) -> Option<f64> {
    match s {
        JSON_INF => Some(f64::INFINITY),
        JSON_MINUS_INF => Some(f64::NEG_INFINITY),
        JSON_NAN => Some(f64::NAN),
        _ => s.parse().ok(),
    }
}

pub fn parse_f32(s: &str) -> Option<f32> {
    parse_f64(s).map(|v| v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_special_values_as_quoted_tokens() {
        assert_eq!(format_f64(f64::INFINITY), "\"Infinity\"");
        assert_eq!(format_f64(f64::NEG_INFINITY), "\"-Infinity\"");
        assert_eq!(format_f64(f64::NAN), "\"NaN\"");
        assert_eq!(format_f64(1.5), "1.5");
    }

    #[test]
    fn parses_special_tokens_back() {
        assert!(parse_f64("Infinity").unwrap().is_infinite());
        assert!(parse_f64("NaN").unwrap().is_nan());
        assert_eq!(parse_f64("2.5"), Some(2.5));
    }
}
