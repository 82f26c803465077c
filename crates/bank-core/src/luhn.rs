//! # Luhn Check Digits
//!
//! Check digit computation and verification for card numbers.
//!
//! ## How the Check Digit Is Computed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prefix:      4  0  0  0  0  0  4  9  3  8  3  2  0  8  9              │
//! │  Double?      x     x     x     x     x     x     x     x              │
//! │  Doubled:     8  0  0  0  0  0  8  9  6  8  6  2  0  8 18              │
//! │  Minus 9:     8  0  0  0  0  0  8  9  6  8  6  2  0  8  9              │
//! │                                                                         │
//! │  Sum = 64  →  smallest d with (64 + d) % 10 == 0  →  d = 6             │
//! │                                                                         │
//! │  Card number: 4000004938320896                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Doubling is anchored on the right: the digit that ends up next to the
//! check digit is always doubled, whatever the prefix length.

use crate::error::{CoreError, CoreResult};

/// Computes the Luhn check digit for a string of decimal digits.
///
/// ## Returns
/// * `Ok(d)` - The digit (0..=9) that makes `digits + d` pass [`is_valid`]
/// * `Err(CoreError::InvalidInput)` - Empty input or a non-digit character
///
/// ## Example
/// ```rust
/// use bank_core::luhn::check_digit;
///
/// assert_eq!(check_digit("7992739871").unwrap(), 3);
/// assert!(check_digit("79x2").is_err());
/// ```
pub fn check_digit(digits: &str) -> CoreResult<u8> {
    if digits.is_empty() {
        return Err(CoreError::invalid_input(digits, "no digits"));
    }

    let mut sum: u32 = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let value = c.to_digit(10).ok_or_else(|| {
            CoreError::invalid_input(digits, format!("non-digit character '{}'", c))
        })?;

        let value = if i % 2 == 0 {
            let doubled = value * 2;
            if doubled > 9 {
                doubled - 9
            } else {
                doubled
            }
        } else {
            value
        };

        sum += value;
    }

    Ok(((10 - sum % 10) % 10) as u8)
}

/// Checks whether a full number (prefix + check digit) is Luhn-valid.
///
/// The last character is taken as the claimed check digit; the digit is
/// recomputed over the rest and the rebuilt string must equal the input.
/// Malformed input is never valid.
pub fn is_valid(number: &str) -> bool {
    if number.len() < 2 || !number.is_ascii() {
        return false;
    }

    let (prefix, _claimed) = number.split_at(number.len() - 1);

    match check_digit(prefix) {
        Ok(digit) => format!("{}{}", prefix, digit) == number,
        Err(_) => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_check_digits() {
        assert_eq!(check_digit("7992739871").unwrap(), 3);
        assert_eq!(check_digit("400000493832089").unwrap(), 6);
        assert_eq!(check_digit("400000844943340").unwrap(), 3);
        assert_eq!(check_digit("0").unwrap(), 0);
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(matches!(
            check_digit("4000a0"),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(check_digit("").is_err());
        assert!(check_digit("12 34").is_err());
        assert!(check_digit("-123").is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("79927398713"));
        assert!(is_valid("4000004938320896"));
        assert!(is_valid("4000008449433403"));

        assert!(!is_valid("4000004938320895"));
        assert!(!is_valid("79927398710"));
    }

    #[test]
    fn test_is_valid_malformed() {
        assert!(!is_valid(""));
        assert!(!is_valid("4"));
        assert!(!is_valid("400000493832089x"));
        assert!(!is_valid("40000049383208٩6"));
        assert!(!is_valid(" 4000004938320896"));
    }

    #[test]
    fn test_every_account_prefix_validates() {
        // Sample the 9-digit account range with a stride that hits every
        // residue class of the last few digits.
        let mut account = crate::MIN_ACCOUNT_NUMBER;
        while account <= crate::MAX_ACCOUNT_NUMBER {
            let prefix = format!("{}{}", crate::DEFAULT_BANK_ID, account);
            let digit = check_digit(&prefix).unwrap();
            assert!(digit <= 9);
            assert!(is_valid(&format!("{}{}", prefix, digit)), "{}", prefix);
            account += 7_919_113;
        }
    }

    #[test]
    fn test_single_digit_substitution_is_detected() {
        for number in ["4000004938320896", "4000008449433403", "79927398713"] {
            let digits: Vec<char> = number.chars().collect();
            for pos in 0..digits.len() - 1 {
                for replacement in '0'..='9' {
                    if replacement == digits[pos] {
                        continue;
                    }
                    let mut mutated = digits.clone();
                    mutated[pos] = replacement;
                    let mutated: String = mutated.into_iter().collect();
                    assert!(!is_valid(&mutated), "{} should be invalid", mutated);
                }
            }
        }
    }
}
