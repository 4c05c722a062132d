//! Duration expressions: a possibly signed sequence of decimal numbers, each
//! with an optional fraction and a unit suffix, such as `"300ms"`, `"1.5h"` or
//! `"2h45m"`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
//!
//! [`Duration`] destinations accept non-negative expressions only.
//! [`SignedDuration`] covers the full signed 64-bit nanosecond range.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

// Largest magnitude a signed 64-bit nanosecond count can hold (negative side).
const LIMIT: u64 = 1 << 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("negative duration {0:?} cannot be represented")]
    Negative(String),
}

/// Parse a duration expression into a [`Duration`].
///
/// Negative expressions other than zero are rejected since `Duration` is unsigned.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let (negative, nanos) = parse_nanos(input)?;
    if negative && nanos != 0 {
        return Err(DurationError::Negative(input.to_owned()));
    }
    Ok(Duration::from_nanos(nanos))
}

/// Parse a duration expression into a [`SignedDuration`].
pub fn parse_signed_duration(input: &str) -> Result<SignedDuration, DurationError> {
    let (negative, nanos) = parse_nanos(input)?;
    let invalid = || DurationError::Invalid(input.to_owned());
    let nanos = if negative {
        0i64.checked_sub_unsigned(nanos).ok_or_else(invalid)?
    } else {
        i64::try_from(nanos).map_err(|_| invalid())?
    };
    Ok(SignedDuration::from_nanos(nanos))
}

/// A span of time that may be negative, stored as signed nanoseconds.
///
/// Use it for settings such as clock offsets where `-30s` is meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedDuration {
    nanos: i64,
}

impl SignedDuration {
    pub const ZERO: Self = Self { nanos: 0 };
    pub const MIN: Self = Self { nanos: i64::MIN };
    pub const MAX: Self = Self { nanos: i64::MAX };

    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// Saturates at the ends of the nanosecond range.
    pub const fn from_secs(secs: i64) -> Self {
        Self {
            nanos: secs.saturating_mul(SECOND as i64),
        }
    }

    pub const fn as_nanos(self) -> i64 {
        self.nanos
    }

    pub const fn is_negative(self) -> bool {
        self.nanos < 0
    }

    /// Magnitude as an unsigned [`Duration`].
    pub const fn unsigned_abs(self) -> Duration {
        Duration::from_nanos(self.nanos.unsigned_abs())
    }
}

impl From<SignedDuration> for i64 {
    fn from(duration: SignedDuration) -> Self {
        duration.nanos
    }
}

impl TryFrom<Duration> for SignedDuration {
    type Error = std::num::TryFromIntError;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        i64::try_from(duration.as_nanos()).map(Self::from_nanos)
    }
}

impl FromStr for SignedDuration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_signed_duration(s)
    }
}

impl fmt::Display for SignedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{:?}", self.unsigned_abs())
    }
}

/// Sign and magnitude in nanoseconds. The magnitude fits a signed 64-bit count.
fn parse_nanos(input: &str) -> Result<(bool, u64), DurationError> {
    let invalid = || DurationError::Invalid(input.to_owned());

    let mut rest = input;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok((negative, 0));
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, after) = leading_int(rest).ok_or_else(invalid)?;
        let has_whole = after.len() != rest.len();
        rest = after;

        let mut fraction = 0;
        let mut scale = 1.0;
        let mut has_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, digits_scale, after) = leading_fraction(after_dot);
            has_fraction = after.len() != after_dot.len();
            fraction = digits;
            scale = digits_scale;
            rest = after;
        }
        if !has_whole && !has_fraction {
            return Err(invalid());
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_end == 0 {
            return Err(DurationError::MissingUnit(input.to_owned()));
        }
        let (name, after) = rest.split_at(unit_end);
        rest = after;
        let unit = unit_nanos(name).ok_or_else(|| DurationError::UnknownUnit {
            unit: name.to_owned(),
            input: input.to_owned(),
        })?;

        let mut value = whole
            .checked_mul(unit)
            .filter(|v| *v <= LIMIT)
            .ok_or_else(invalid)?;
        if fraction > 0 {
            let extra = (fraction as f64 * (unit as f64 / scale)) as u64;
            value = value
                .checked_add(extra)
                .filter(|v| *v <= LIMIT)
                .ok_or_else(invalid)?;
        }
        total = total
            .checked_add(value)
            .filter(|v| *v <= LIMIT)
            .ok_or_else(invalid)?;
    }

    if !negative && total == LIMIT {
        return Err(invalid());
    }
    Ok((negative, total))
}

fn unit_nanos(name: &str) -> Option<u64> {
    match name {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Consume leading decimal digits. `None` on overflow.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut value: u64 = 0;
    for digit in s[..end].bytes() {
        value = value
            .checked_mul(10)?
            .checked_add(u64::from(digit - b'0'))
            .filter(|v| *v <= LIMIT)?;
    }
    Some((value, &s[end..]))
}

/// Consume leading fraction digits, returning the digits as an integer and the
/// power of ten they are scaled by. Digits beyond what fits are dropped.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut value: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for digit in s[..end].bytes() {
        if overflow {
            continue;
        }
        match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(digit - b'0')))
            .filter(|v| *v <= LIMIT)
        {
            Some(next) => {
                value = next;
                scale *= 10.0;
            }
            None => overflow = true,
        }
    }
    (value, scale, &s[end..])
}
