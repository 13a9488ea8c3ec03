//! Go-style duration syntax.
//!
//! Program files and the `/play` endpoint express dwell times the way
//! Go's `time.ParseDuration` does: one or more `<number><unit>` groups,
//! e.g. `"10s"`, `"2m"`, `"1h30m"`, `"1.5s"`, `"300ms"`.

use std::time::Duration;

use crate::error::{Error, Result};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" => Some(1_000.0),
        "ms" => Some(1_000_000.0),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60.0 * NANOS_PER_SEC),
        "h" => Some(3600.0 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parses a Go-syntax duration string.
///
/// Dwell times are non-negative: a leading `-` is rejected even though
/// Go itself would accept it.
pub fn parse_go_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::InvalidDuration(input.to_string());

    let mut s = input.trim();
    s = s.strip_prefix('+').unwrap_or(s);
    if s.starts_with('-') || s.is_empty() {
        return Err(invalid());
    }
    // Go special-cases a bare zero with no unit.
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos = 0.0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(invalid)?;
        if num_end == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..num_end].parse().map_err(|_| invalid())?;

        let after_num = &rest[num_end..];
        let unit_end = after_num
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_num.len());
        let factor = unit_nanos(&after_num[..unit_end]).ok_or_else(invalid)?;

        total_nanos += value * factor;
        rest = &after_num[unit_end..];
    }

    if !total_nanos.is_finite() || total_nanos < 0.0 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_units() {
        assert_eq!(parse_go_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_go_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_go_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(
            parse_go_duration("300ms").unwrap(),
            Duration::from_millis(300)
        );
    }

    #[test]
    fn parses_compound_and_fractional() {
        assert_eq!(
            parse_go_duration("1h30m").unwrap(),
            Duration::from_secs(5400)
        );
        assert_eq!(
            parse_go_duration("1.5s").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            parse_go_duration("2m30s").unwrap(),
            Duration::from_secs(150)
        );
    }

    #[test]
    fn accepts_bare_zero() {
        assert_eq!(parse_go_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "10", "s", "ten seconds", "10x", "-5s", "5ss", "1.2.3s"] {
            assert!(parse_go_duration(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(parse_go_duration(" 10s ").unwrap(), Duration::from_secs(10));
    }
}
