//! Parsing and formatting of expense amounts.
//!
//! Amounts are Colombian pesos held as **integer cents** in [`MoneyCents`],
//! so sums never drift. Display follows the local convention: `.` groups
//! thousands, `,` separates cents, and cents are only shown when non-zero.
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const CURRENCY_SYMBOL: &str = "$";
const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Signed money amount represented as integer cents.
///
/// ```rust
/// use engine::money::MoneyCents;
///
/// assert_eq!(MoneyCents::new(1_234_567_00).to_string(), "$ 1.234.567");
/// assert_eq!(MoneyCents::new(99_90).to_string(), "$ 99,90");
/// assert_eq!("1.000".parse::<MoneyCents>().unwrap().cents(), 1_000_00);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 10_50);
/// assert!("12,345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The amount without currency symbol, as typed into the form:
    /// `1.234` or `1.234,50`.
    #[must_use]
    pub fn plain(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = group_thousands(abs / 100);
        match abs % 100 {
            0 => format!("{sign}{units}"),
            cents => format!("{sign}{units}{DECIMAL_SEPARATOR}{cents:02}"),
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.plain();
        match plain.strip_prefix('-') {
            Some(abs) => write!(f, "-{CURRENCY_SYMBOL} {abs}"),
            None => write!(f, "{CURRENCY_SYMBOL} {plain}"),
        }
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for MoneyCents {
    type Err = ValidationError;

    /// Parses an amount written the way it is displayed.
    ///
    /// An optional `$` and leading `+`/`-` are accepted. `.` followed by
    /// exactly three digits groups thousands; otherwise `.` or `,` starts the
    /// cents, which may have at most 2 digits (rejects `12,345`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || ValidationError::InvalidAmount(format!("\"{raw}\" is not a number"));
        let overflow = || ValidationError::InvalidAmount(format!("\"{raw}\" is too large"));

        let (negative, rest) = match raw.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let rest = rest.strip_prefix(CURRENCY_SYMBOL).unwrap_or(rest).trim_start();
        if rest.is_empty() {
            return Err(invalid());
        }

        let (whole, fraction) = split_fraction(rest).ok_or_else(invalid)?;
        let units = parse_grouped(whole).ok_or_else(invalid)?;
        let cents = match fraction {
            None | Some("") => 0,
            Some(frac) if !frac.chars().all(|c| c.is_ascii_digit()) => return Err(invalid()),
            Some(frac) if frac.len() == 1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            Some(frac) if frac.len() == 2 => frac.parse::<i64>().map_err(|_| invalid())?,
            Some(_) => {
                return Err(ValidationError::InvalidAmount(format!(
                    "\"{raw}\" has more than 2 decimals"
                )));
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;
        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

/// Split `input` into the whole part and the cents, if any.
fn split_fraction(input: &str) -> Option<(&str, Option<&str>)> {
    if let Some((whole, fraction)) = input.rsplit_once(DECIMAL_SEPARATOR) {
        return Some((whole, Some(fraction)));
    }
    match input.rsplit_once(THOUSANDS_SEPARATOR) {
        Some((_, group)) if group.len() == 3 => Some((input, None)),
        // A `.` decimal point cannot be mixed with `.` grouping.
        Some((whole, fraction)) if !whole.contains(THOUSANDS_SEPARATOR) => {
            Some((whole, Some(fraction)))
        }
        Some(_) => None,
        None => Some((input, None)),
    }
}

/// `1234` or `1.234`; every group after the first has exactly 3 digits.
fn parse_grouped(whole: &str) -> Option<i64> {
    let mut groups = whole.split(THOUSANDS_SEPARATOR);
    let first = groups.next()?;
    if first.is_empty() || !first.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut digits = first.to_string();
    for group in groups {
        if first.len() > 3 || group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }
    digits.parse().ok()
}

/// Parses user input into a non-negative amount.
///
/// ```rust
/// use engine::money::{MoneyCents, parse_amount};
///
/// assert_eq!(parse_amount("50000").unwrap(), MoneyCents::new(5_000_000));
/// assert_eq!(parse_amount(" 12,5 ").unwrap(), MoneyCents::new(1250));
/// assert!(parse_amount("-3").is_err());
/// assert!(parse_amount("abc").is_err());
/// ```
pub fn parse_amount(input: &str) -> Result<MoneyCents, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    let amount: MoneyCents = input.parse()?;
    if amount.is_negative() {
        return Err(ValidationError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }
    Ok(amount)
}

/// Formats an amount with the currency symbol and thousands separators.
///
/// ```rust
/// use engine::money::{MoneyCents, format_amount};
///
/// assert_eq!(format_amount(MoneyCents::new(1_234_567_00)), "$ 1.234.567");
/// assert_eq!(format_amount(MoneyCents::ZERO), "$ 0");
/// ```
pub fn format_amount(amount: MoneyCents) -> String {
    amount.to_string()
}
