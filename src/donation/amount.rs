//! Donation amount parsing.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Lamports are 10^-9 SOL; anything finer cannot be sent.
pub const MAX_FRACTION_DIGITS: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("amount must be greater than zero")]
    NonPositive,

    #[error("amount has more than {max} decimal places")]
    TooPrecise { max: u32 },

    #[error("amount is too large")]
    TooLarge,
}

/// A validated, strictly positive amount of SOL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAmount {
    sol: Decimal,
    lamports: u64,
}

impl ParsedAmount {
    pub fn sol(&self) -> Decimal {
        self.sol
    }

    /// The amount in the chain's minor unit.
    pub fn lamports(&self) -> u64 {
        self.lamports
    }
}

impl fmt::Display for ParsedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOL", self.sol)
    }
}

/// Parse free-text input into an amount.
///
/// Accepts plain decimals and scientific notation; surrounding whitespace is
/// ignored. Precision is judged on the digits as written, so no input is
/// rounded on its way to lamports.
pub fn validate(amount: &str) -> Result<ParsedAmount, ValidationError> {
    let trimmed = amount.trim();
    let number = Lexed::parse(trimmed).ok_or_else(|| {
        ValidationError::NotANumber(if trimmed.is_empty() { amount } else { trimmed }.to_string())
    })?;

    let digits = format!("{}{}", number.int, number.frac);
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() || number.negative {
        return Err(ValidationError::NonPositive);
    }
    let leading_zeros = (digits.len() - significant.len()) as i64;
    let significant = significant.trim_end_matches('0');

    // Position of the decimal point, counted from the first significant digit.
    let out_of_range = if number.exponent.starts_with('-') {
        ValidationError::TooPrecise {
            max: MAX_FRACTION_DIGITS,
        }
    } else {
        ValidationError::TooLarge
    };
    let exponent: i64 = if number.exponent.is_empty() {
        0
    } else {
        number.exponent.parse().map_err(|_| out_of_range.clone())?
    };
    let point = (number.int.len() as i64 - leading_zeros)
        .checked_add(exponent)
        .ok_or(out_of_range)?;

    let scale = significant.len() as i64 - point;
    if scale > MAX_FRACTION_DIGITS as i64 {
        return Err(ValidationError::TooPrecise {
            max: MAX_FRACTION_DIGITS,
        });
    }

    let shift = u32::try_from(MAX_FRACTION_DIGITS as i64 - scale)
        .map_err(|_| ValidationError::TooLarge)?;
    let lamports = significant
        .parse::<u64>()
        .ok()
        .zip(10u64.checked_pow(shift))
        .and_then(|(value, factor)| value.checked_mul(factor))
        .ok_or(ValidationError::TooLarge)?;

    let sol = Decimal::from_i128_with_scale(lamports as i128, MAX_FRACTION_DIGITS).normalize();
    Ok(ParsedAmount { sol, lamports })
}

/// Lexical pieces of `[+-]digits[.digits][(e|E)[+-]digits]`.
struct Lexed<'a> {
    negative: bool,
    int: &'a str,
    frac: &'a str,
    /// Exponent text including its sign; empty when absent.
    exponent: &'a str,
}

impl<'a> Lexed<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let (negative, rest) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        if !is_digits(int) || !is_digits(frac) {
            return None;
        }

        let exponent = match exponent {
            Some(exp) => {
                let unsigned = exp.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exp);
                if unsigned.is_empty() || !is_digits(unsigned) {
                    return None;
                }
                exp
            }
            None => "",
        };

        Some(Self {
            negative,
            int,
            frac,
            exponent,
        })
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Suggested amount at `index`, if configured.
pub fn preset(presets: &[String], index: usize) -> Option<&str> {
    presets.get(index).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::LAMPORTS_PER_SOL;

    #[test]
    fn test_valid_amounts() {
        assert_eq!(validate("0.1").unwrap().lamports(), 100_000_000);
        assert_eq!(validate("1").unwrap().lamports(), LAMPORTS_PER_SOL);
        assert_eq!(validate(" 2.5 ").unwrap().lamports(), 2_500_000_000);
        assert_eq!(validate("0.000000001").unwrap().lamports(), 1);
        assert_eq!(validate("5e-1").unwrap().lamports(), 500_000_000);
        assert_eq!(validate("1.500000000000").unwrap().lamports(), 1_500_000_000);
        assert_eq!(validate("+.25").unwrap().lamports(), 250_000_000);
        assert_eq!(validate("1E2").unwrap().lamports(), 100 * LAMPORTS_PER_SOL);
        assert_eq!(validate("1500e-9").unwrap().lamports(), 1_500);
    }

    #[test]
    fn test_not_a_number() {
        for input in [
            "", "   ", "abc", "NaN", "inf", "-inf", "1.2.3", "0x10", "1_000", ".", "-", "1e", "e5",
            "1e+", "١",
        ] {
            assert!(
                matches!(validate(input), Err(ValidationError::NotANumber(_))),
                "{:?} should not parse",
                input
            );
        }
    }

    #[test]
    fn test_non_positive() {
        for input in ["0", "0.0", "-1", "-0.5", "-1e-3", "0e99999999999999999999", "-1e-40"] {
            assert_eq!(validate(input), Err(ValidationError::NonPositive), "{:?}", input);
        }
    }

    #[test]
    fn test_too_precise() {
        for input in [
            "0.0000000001",
            "0.1000000000000000000000000000001",
            "0.00000000000000000000000000000001",
            "1e-10",
            "1e-99999999999999999999",
        ] {
            assert_eq!(
                validate(input),
                Err(ValidationError::TooPrecise { max: 9 }),
                "{:?}",
                input
            );
        }
    }

    #[test]
    fn test_too_large() {
        for input in ["18446744074", "1e30", "1e99999999999999999999", "99999999999999999999999"] {
            assert_eq!(validate(input), Err(ValidationError::TooLarge), "{:?}", input);
        }
        assert_eq!(validate("18446744073").unwrap().lamports(), 18_446_744_073 * LAMPORTS_PER_SOL);
        assert_eq!(validate("18446744073.709551615").unwrap().lamports(), u64::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(validate("0.50").unwrap().to_string(), "0.5 SOL");
    }

    #[test]
    fn test_presets() {
        let presets = vec!["0.1".to_string(), "0.5".to_string(), "1".to_string()];
        assert_eq!(preset(&presets, 1), Some("0.5"));
        assert_eq!(preset(&presets, 3), None);
    }
}
