//! Unsigned integer literals for `filter` expressions, facet constraints and thresholds.
//!
//! Within a query an unsigned value is either an exact number or a range that
//! may be open on either end. Every input shape renders to a string:
//!
//! | input | rendering |
//! |---|---|
//! | `12`, `"12"` | `12` |
//! | `(Some(12), Some(20))`, `"12..20"`, `12..=20` | `12..20` |
//! | `(Some(12), None)`, `"12.."`, `12..` | `12..` |
//! | `(None, Some(20))`, `"..20"`, `..=20` | `..20` |

use std::fmt;
use std::ops::{RangeFrom, RangeInclusive, RangeToInclusive};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CloudSearchError, Result};

static EXACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)$").unwrap());
static FROM_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\.(\d+)?$").unwrap());
static TO_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)?\.\.(\d+)$").unwrap());

/// An exact unsigned integer or an (optionally open-ended) inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UintOrRange {
    /// An exact value.
    Exact(u64),
    /// A range; `None` leaves that end open.
    Range {
        /// Lower bound.
        from: Option<u64>,
        /// Upper bound.
        to: Option<u64>,
    },
}

impl UintOrRange {
    /// Create an exact value.
    pub fn exact(value: u64) -> Self {
        UintOrRange::Exact(value)
    }

    /// Create a range from optional bounds.
    pub fn range(from: Option<u64>, to: Option<u64>) -> Self {
        UintOrRange::Range { from, to }
    }

    /// Create a range open on the upper end.
    pub fn at_least(from: u64) -> Self {
        UintOrRange::range(Some(from), None)
    }

    /// Create a range open on the lower end.
    pub fn at_most(to: u64) -> Self {
        UintOrRange::range(None, Some(to))
    }

    /// A range open on both ends. Renders as `..`.
    pub fn unbounded() -> Self {
        UintOrRange::range(None, None)
    }

    /// Parse the `N`, `N..`, `N..M` and `..M` forms.
    ///
    /// The exact form is tried first, then the lower-bounded and the
    /// upper-bounded range forms. Input matching none of them is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        if let Some(caps) = EXACT_PATTERN.captures(input) {
            return Ok(UintOrRange::Exact(parse_bound(&caps[1], input)?));
        }

        if let Some(caps) = FROM_PATTERN.captures(input) {
            let from = parse_bound(&caps[1], input)?;
            let to = caps
                .get(2)
                .map(|m| parse_bound(m.as_str(), input))
                .transpose()?;
            return Ok(UintOrRange::range(Some(from), to));
        }

        if let Some(caps) = TO_PATTERN.captures(input) {
            let from = caps
                .get(1)
                .map(|m| parse_bound(m.as_str(), input))
                .transpose()?;
            let to = parse_bound(&caps[2], input)?;
            return Ok(UintOrRange::range(from, Some(to)));
        }

        Err(CloudSearchError::malformed(format!(
            "'{input}' is not an unsigned integer or range (expected N, N.., N..M or ..M)"
        )))
    }

    /// Check whether this is an exact value.
    pub fn is_exact(&self) -> bool {
        matches!(self, UintOrRange::Exact(_))
    }

    /// Render the wire form.
    pub fn build(&self) -> String {
        match self {
            UintOrRange::Exact(value) => value.to_string(),
            UintOrRange::Range { from, to } => format!(
                "{}..{}",
                from.map(|v| v.to_string()).unwrap_or_default(),
                to.map(|v| v.to_string()).unwrap_or_default()
            ),
        }
    }
}

fn parse_bound(digits: &str, input: &str) -> Result<u64> {
    digits
        .parse::<u64>()
        .map_err(|e| CloudSearchError::malformed(format!("'{input}': {e}")))
}

fn clamp_signed(value: i64) -> u64 {
    value.max(0) as u64
}

impl fmt::Display for UintOrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl FromStr for UintOrRange {
    type Err = CloudSearchError;

    fn from_str(s: &str) -> Result<Self> {
        UintOrRange::parse(s)
    }
}

impl TryFrom<&str> for UintOrRange {
    type Error = CloudSearchError;

    fn try_from(value: &str) -> Result<Self> {
        UintOrRange::parse(value)
    }
}

impl TryFrom<String> for UintOrRange {
    type Error = CloudSearchError;

    fn try_from(value: String) -> Result<Self> {
        UintOrRange::parse(&value)
    }
}

impl From<&UintOrRange> for UintOrRange {
    fn from(value: &UintOrRange) -> Self {
        *value
    }
}

impl From<u64> for UintOrRange {
    fn from(value: u64) -> Self {
        UintOrRange::Exact(value)
    }
}

impl From<u32> for UintOrRange {
    fn from(value: u32) -> Self {
        UintOrRange::Exact(u64::from(value))
    }
}

impl From<usize> for UintOrRange {
    fn from(value: usize) -> Self {
        UintOrRange::Exact(value as u64)
    }
}

impl From<i64> for UintOrRange {
    fn from(value: i64) -> Self {
        UintOrRange::Exact(clamp_signed(value))
    }
}

impl From<i32> for UintOrRange {
    fn from(value: i32) -> Self {
        UintOrRange::Exact(clamp_signed(i64::from(value)))
    }
}

impl From<f64> for UintOrRange {
    fn from(value: f64) -> Self {
        // `as` truncates and saturates; NaN becomes 0.
        UintOrRange::Exact(value.max(0.0) as u64)
    }
}

impl From<bool> for UintOrRange {
    fn from(value: bool) -> Self {
        UintOrRange::Exact(u64::from(value))
    }
}

impl From<(Option<i64>, Option<i64>)> for UintOrRange {
    fn from((from, to): (Option<i64>, Option<i64>)) -> Self {
        UintOrRange::range(from.map(clamp_signed), to.map(clamp_signed))
    }
}

impl From<[Option<i64>; 2]> for UintOrRange {
    fn from([from, to]: [Option<i64>; 2]) -> Self {
        UintOrRange::from((from, to))
    }
}

impl From<RangeInclusive<u64>> for UintOrRange {
    fn from(range: RangeInclusive<u64>) -> Self {
        let (from, to) = range.into_inner();
        UintOrRange::range(Some(from), Some(to))
    }
}

impl From<RangeFrom<u64>> for UintOrRange {
    fn from(range: RangeFrom<u64>) -> Self {
        UintOrRange::at_least(range.start)
    }
}

impl From<RangeToInclusive<u64>> for UintOrRange {
    fn from(range: RangeToInclusive<u64>) -> Self {
        UintOrRange::at_most(range.end)
    }
}
