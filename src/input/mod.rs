//! Coercion of raw text typed into the count and row fields.
//!
//! Nothing here fails: malformed input collapses to the safe default so the
//! core never sees a negative count or a zero row count. Oversized values
//! clamp to [`MAX_PER_PART`] and [`MAX_ROWS`].

use std::num::NonZeroUsize;

use crate::roster::MAX_PER_PART;
use crate::seating::MAX_ROWS;

/// Parse a head count. Empty, malformed, or negative text becomes 0; values
/// above [`MAX_PER_PART`] clamp to it.
pub fn parse_count(raw: &str) -> u32 {
    match leading_integer(raw) {
        Some(value) if value > 0 => value.min(i128::from(MAX_PER_PART)) as u32,
        _ => 0,
    }
}

/// Parse a row count. Anything that is not a positive integer becomes 1;
/// values above [`MAX_ROWS`] clamp to it.
pub fn parse_row_count(raw: &str) -> NonZeroUsize {
    leading_integer(raw)
        .filter(|value| *value > 0)
        .map(|value| value.min(MAX_ROWS as i128) as usize)
        .and_then(NonZeroUsize::new)
        .unwrap_or(NonZeroUsize::MIN)
}

/// Optional sign followed by the leading run of ASCII digits, so `"12 rows"`
/// reads as 12 the way a lenient number field would.
fn leading_integer(raw: &str) -> Option<i128> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i128>().unwrap_or(i128::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accept_plain_numbers() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count("  7 "), 7);
        assert_eq!(parse_count("+3"), 3);
        assert_eq!(parse_count("5 singers"), 5);
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("-4"), 0);
        assert_eq!(parse_count("-"), 0);
    }

    #[test]
    fn counts_clamp_to_the_part_limit() {
        assert_eq!(parse_count("999999999999"), MAX_PER_PART);
        assert_eq!(parse_count("9".repeat(60).as_str()), MAX_PER_PART);
        assert_eq!(parse_count("999"), 999);
    }

    #[test]
    fn row_counts_clamp_to_the_row_limit() {
        assert_eq!(parse_row_count("999999999999").get(), MAX_ROWS);
        assert_eq!(parse_row_count("100").get(), MAX_ROWS);
        assert_eq!(parse_row_count("99").get(), 99);
    }

    #[test]
    fn row_counts_default_to_one() {
        assert_eq!(parse_row_count("4").get(), 4);
        assert_eq!(parse_row_count("").get(), 1);
        assert_eq!(parse_row_count("0").get(), 1);
        assert_eq!(parse_row_count("-2").get(), 1);
        assert_eq!(parse_row_count("rows").get(), 1);
    }
}
