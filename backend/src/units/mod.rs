//! Value normalization helpers.
//!
//! Exact conversions on decimal and hex strings. Amounts are shifted as
//! digit strings rather than parsed into a fixed-width integer, so any
//! length of input converts without loss.

use crate::error::{FormatError, FormatResult};

/// Decimals of the native unit on EVM chains (1 ETH = 10^18 wei).
pub const WEI_DECIMALS: u32 = 18;

/// Length of `0x` plus a 4-byte function selector.
pub const SELECTOR_LEN: usize = 10;

/// Placeholder written when call data carries no selector.
pub const NO_SELECTOR: &str = "N/A";

/// Extract the function selector from hex call data.
///
/// Returns the first 10 characters when `input` starts with `0x` and is at
/// least that long, `None` otherwise (absent, empty, `"0x"`, too short).
///
/// # Example
/// ```
/// use chainexport::units::method_selector;
///
/// assert_eq!(method_selector(Some("0xa9059cbb000000")), Some("0xa9059cbb"));
/// assert_eq!(method_selector(Some("0x12")), None);
/// assert_eq!(method_selector(None), None);
/// ```
pub fn method_selector(input: Option<&str>) -> Option<&str> {
    let input = input?;
    if !input.starts_with("0x") {
        return None;
    }
    // Counted in characters, not bytes
    match input.char_indices().nth(SELECTOR_LEN) {
        Some((end, _)) => Some(&input[..end]),
        None if input.chars().count() == SELECTOR_LEN => Some(input),
        None => None,
    }
}

/// Convert an integer amount in minor units to a fixed-point major-unit string.
///
/// `decimals` is the unit exponent (18 for wei → ETH), `precision` the number
/// of fractional digits written. When `precision < decimals` the result is
/// rounded half-up.
///
/// # Example
/// ```
/// use chainexport::units::from_minor_units;
///
/// assert_eq!(from_minor_units("1000000000000000000", 18, 18).unwrap(), "1.000000000000000000");
/// assert_eq!(from_minor_units("1", 18, 18).unwrap(), "0.000000000000000001");
/// ```
pub fn from_minor_units(value: &str, decimals: u32, precision: u32) -> FormatResult<String> {
    let digits = parse_digits(value)?;
    let decimals = decimals as usize;
    let precision = precision as usize;

    // Left-pad so there is always at least one integer digit
    let mut padded = String::with_capacity(digits.len().max(decimals + 1));
    for _ in digits.len()..decimals + 1 {
        padded.push('0');
    }
    padded.push_str(digits);

    let split = padded.len() - decimals;
    let (int_part, frac_part) = padded.split_at(split);

    let (int_part, frac_part) = if precision >= decimals {
        let mut frac = frac_part.to_string();
        frac.extend(std::iter::repeat('0').take(precision - decimals));
        (int_part.to_string(), frac)
    } else {
        round_half_up(int_part, frac_part, precision)
    };

    if precision == 0 {
        Ok(int_part)
    } else {
        Ok(format!("{}.{}", int_part, frac_part))
    }
}

/// Validate a decimal integer string and strip its leading zeros.
fn parse_digits(value: &str) -> FormatResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::NotAnInteger(value.to_string()));
    }
    let stripped = trimmed.trim_start_matches('0');
    Ok(if stripped.is_empty() { "0" } else { stripped })
}

/// Keep `precision` fractional digits, rounding on the first dropped digit.
fn round_half_up(int_part: &str, frac_part: &str, precision: usize) -> (String, String) {
    let round_up = frac_part.as_bytes()[precision] >= b'5';
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(precision))
        .collect();

    if round_up {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    // Only ASCII digits were pushed above
    let kept = String::from_utf8_lossy(&kept).into_owned();
    let split = kept.len() - precision;
    (kept[..split].to_string(), kept[split..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_selector() {
        assert_eq!(
            method_selector(Some("0xa9059cbb000000000000000000000000d8da6bf2")),
            Some("0xa9059cbb")
        );
        assert_eq!(method_selector(Some("0xa9059cbb")), Some("0xa9059cbb"));
        assert_eq!(method_selector(Some("0x12")), None);
        assert_eq!(method_selector(Some("0x")), None);
        assert_eq!(method_selector(Some("")), None);
        assert_eq!(method_selector(None), None);
    }

    #[test]
    fn test_method_selector_requires_lowercase_prefix() {
        assert_eq!(method_selector(Some("0Xa9059cbb0000")), None);
        assert_eq!(method_selector(Some("a9059cbb00000000")), None);
    }

    #[test]
    fn test_method_selector_counts_characters() {
        assert_eq!(method_selector(Some("0xé12345678")), Some("0xé1234567"));
        assert_eq!(method_selector(Some("0x1234567é")), Some("0x1234567é"));
        assert_eq!(method_selector(Some("0x123456é")), None);
    }

    #[test]
    fn test_wei_to_eth() {
        assert_eq!(
            from_minor_units("1000000000000000000", WEI_DECIMALS, WEI_DECIMALS).unwrap(),
            "1.000000000000000000"
        );
        assert_eq!(
            from_minor_units("0", WEI_DECIMALS, WEI_DECIMALS).unwrap(),
            "0.000000000000000000"
        );
        assert_eq!(
            from_minor_units("1", WEI_DECIMALS, WEI_DECIMALS).unwrap(),
            "0.000000000000000001"
        );
        assert_eq!(
            from_minor_units("1234500000000000000", WEI_DECIMALS, WEI_DECIMALS).unwrap(),
            "1.234500000000000000"
        );
    }

    #[test]
    fn test_beyond_native_integer_range() {
        // 2^64 wei
        assert_eq!(
            from_minor_units("18446744073709551616", 18, 18).unwrap(),
            "18.446744073709551616"
        );
        // 2^128 wei
        assert_eq!(
            from_minor_units("340282366920938463463374607431768211456", 18, 18).unwrap(),
            "340282366920938463463.374607431768211456"
        );
    }

    #[test]
    fn test_leading_zeros_and_whitespace() {
        assert_eq!(from_minor_units("000042", 2, 2).unwrap(), "0.42");
        assert_eq!(from_minor_units(" 1500 ", 3, 3).unwrap(), "1.500");
    }

    #[test]
    fn test_precision_padding_and_rounding() {
        assert_eq!(from_minor_units("15", 1, 3).unwrap(), "1.500");
        assert_eq!(from_minor_units("1449", 3, 1).unwrap(), "1.4");
        assert_eq!(from_minor_units("1450", 3, 1).unwrap(), "1.5");
        assert_eq!(from_minor_units("9999", 3, 2).unwrap(), "10.00");
        assert_eq!(from_minor_units("999", 3, 0).unwrap(), "1");
        assert_eq!(from_minor_units("42", 0, 0).unwrap(), "42");
        assert_eq!(from_minor_units("42", 0, 2).unwrap(), "42.00");
    }

    #[test]
    fn test_not_an_integer() {
        for bad in ["", "  ", "abc", "-1", "1.5", "1e18", "0x10", "+5"] {
            assert_eq!(
                from_minor_units(bad, 18, 18),
                Err(FormatError::NotAnInteger(bad.to_string())),
                "input {:?}",
                bad
            );
        }
    }
}
