//! Fiscal quarter keys: parsing from filenames and display labels, ordering,
//! and release-tag rendering.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `Q226` style code embedded in report filenames: quarter digit 1-4
/// followed by a two-digit fiscal year.
static QUARTER_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Q([1-4])(\d{2})").unwrap());

/// `Q3 FY24` style display label used in table headers.
static QUARTER_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Q([1-4])\s*FY(\d{2})").unwrap());

/// An orderable (fiscal year, quarter) pair.
///
/// Ordering is year-major, so Q4 FY24 sorts before Q1 FY25. The zero value
/// is the sentinel returned when no quarter pattern could be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterKey {
    pub year: i64,
    pub quarter: i64,
}

impl QuarterKey {
    pub const SENTINEL: QuarterKey = QuarterKey { year: 0, quarter: 0 };

    pub fn new(year: i64, quarter: i64) -> Self {
        Self { year, quarter }
    }

    /// True when this key is the no-match sentinel.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl fmt::Display for QuarterKey {
    /// Release-tag form, e.g. `2026.Q2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.Q{}", self.year, self.quarter)
    }
}

/// Scan `text` (typically a filename) for a `Q226` style quarter code.
///
/// The two-digit year maps to a full year via `2000 + yy`; the domain's
/// horizon never crosses a century boundary. Returns [`QuarterKey::SENTINEL`]
/// when no code is present; this function never fails.
pub fn parse_quarter_key(text: &str) -> QuarterKey {
    match QUARTER_CODE_RE.captures(text) {
        Some(caps) => {
            let quarter: i64 = caps[1].parse().unwrap_or(0);
            let year: i64 = caps[2].parse().unwrap_or(0);
            QuarterKey::new(2000 + year, quarter)
        }
        None => QuarterKey::SENTINEL,
    }
}

/// Parse a display label such as `"Q3 FY24"` into `(fiscal_year, quarter)`.
pub fn parse_quarter_label(label: &str) -> Option<(i64, i64)> {
    let caps = QUARTER_LABEL_RE.captures(label)?;
    let quarter: i64 = caps[1].parse().ok()?;
    let year: i64 = caps[2].parse().ok()?;
    Some((2000 + year, quarter))
}
