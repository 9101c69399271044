use std::{
    fmt,
    ops::{Add, AddAssign},
    str::FromStr,
};

use crate::EngineError;

/// Non-negative money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (expense amounts
/// and report totals) to avoid floating-point drift. Amounts are
/// currency-agnostic: the ledger never converts between currencies.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34).unwrap();
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals and negative values):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// assert!("-1".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    ///
    /// Fails for negative values.
    pub fn new(cents: i64) -> Result<Self, EngineError> {
        if cents < 0 {
            return Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }
        Ok(Self(cents))
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / 100;
        let cents = self.0 % 100;
        write!(f, "{units}.{cents:02}")
    }
}

/// Sum of many [`MoneyCents`], in **integer cents**.
///
/// Report totals are accumulated here rather than in [`MoneyCents`]: every
/// stored amount fits an `i64`, their sum does not have to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoneyTotal(i128);

impl MoneyTotal {
    pub const ZERO: MoneyTotal = MoneyTotal(0);

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i128 {
        self.0
    }
}

impl Add<MoneyCents> for MoneyTotal {
    type Output = MoneyTotal;

    fn add(self, amount: MoneyCents) -> MoneyTotal {
        MoneyTotal(self.0.saturating_add(i128::from(amount.0)))
    }
}

impl AddAssign<MoneyCents> for MoneyTotal {
    fn add_assign(&mut self, amount: MoneyCents) {
        *self = *self + amount;
    }
}

impl fmt::Display for MoneyTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / 100;
        let cents = self.0 % 100;
        write!(f, "{units}.{cents:02}")
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects negative, empty and non-numeric strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        if trimmed.starts_with('-') {
            return Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }
        let rest = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    // "12.500" carries no extra precision.
                    _ if frac[2..].chars().all(|c| c == '0') => {
                        frac[..2].parse::<i64>().map_err(|_| invalid())?
                    }
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        Ok(MoneyCents(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::ZERO.to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).unwrap().to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).unwrap().to_string(), "0.10");
        assert_eq!(MoneyCents::new(1250).unwrap().to_string(), "12.50");
        assert_eq!(MoneyCents::new(100_000).unwrap().to_string(), "1000.00");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
        assert_eq!("7.".parse::<MoneyCents>().unwrap().cents(), 700);
        assert_eq!("12.500".parse::<MoneyCents>().unwrap().cents(), 1250);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("0.001".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert_eq!(
            "-0.01".parse::<MoneyCents>(),
            Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string()
            ))
        );
        assert!("abc".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("NaN".parse::<MoneyCents>().is_err());
        assert!("1e3".parse::<MoneyCents>().is_err());
        assert!(MoneyCents::new(-5).is_err());
    }

    #[test]
    fn total_holds_sums_beyond_i64() {
        let max = MoneyCents::new(i64::MAX).unwrap();
        let total = MoneyTotal::ZERO + max + max + MoneyCents::new(2).unwrap();
        assert_eq!(total.cents(), i128::from(i64::MAX) * 2 + 2);
        assert_eq!(
            (MoneyTotal::ZERO + MoneyCents::new(1250).unwrap()).to_string(),
            "12.50"
        );
    }
}
