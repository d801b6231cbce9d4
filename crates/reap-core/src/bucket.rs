//! Bucket keys and the clock that turns them into end instants.
//!
//! A bucket directory's path below `<company>/<tag>/` is a contiguous prefix
//! of `year/month/day/hour/minute`. A prefix names a *range*: `2024/03` is
//! all of March 2024. The end instant is the last second of that range, and
//! a bucket only expires once that whole range is behind the cutoff.

use chrono::{Months, NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;

/// Maximum number of date components in a bucket path (year to minute).
pub const MAX_COMPONENTS: usize = 5;

/// Largest accepted year. Keeps four-digit directory names and leaves room
/// for the end-of-year rollover.
pub const MAX_YEAR: u32 = 9999;

/// The most specific unit present in a [`BucketKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    /// `year`
    Year,
    /// `year/month`
    Month,
    /// `year/month/day`
    Day,
    /// `year/month/day/hour`
    Hour,
    /// `year/month/day/hour/minute`
    Minute,
}

impl Granularity {
    /// Granularity implied by the number of path components.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(Self::Year),
            2 => Some(Self::Month),
            3 => Some(Self::Day),
            4 => Some(Self::Hour),
            5 => Some(Self::Minute),
            _ => None,
        }
    }

    /// Lowercase unit name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
        }
    }

    /// Start of the following unit, or `None` past the calendar's range.
    fn next_start(self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Year => start.checked_add_months(Months::new(12)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::Day => start.checked_add_signed(TimeDelta::days(1)),
            Self::Hour => start.checked_add_signed(TimeDelta::hours(1)),
            Self::Minute => start.checked_add_signed(TimeDelta::minutes(1)),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bucket path segment that is not a valid date component.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bucket segment '{segment}': {reason}")]
pub struct MalformedBucketPath {
    /// The offending segment (empty when the problem is the segment count).
    pub segment: String,
    /// What is wrong with it.
    pub reason: String,
}

impl MalformedBucketPath {
    fn new(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            reason: reason.into(),
        }
    }
}

/// Validation failure before it is tied back to the caller's segment text.
struct Invalid {
    component: Option<usize>,
    reason: String,
}

impl Invalid {
    fn at(component: usize, reason: impl Into<String>) -> Self {
        Self {
            component: Some(component),
            reason: reason.into(),
        }
    }

    fn count(reason: String) -> Self {
        Self {
            component: None,
            reason,
        }
    }
}

/// A validated, possibly partial, `year/month/day/hour/minute` key.
///
/// Start and end instants are computed once at construction, so every
/// accessor is infallible and no calendar state is shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    granularity: Granularity,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl BucketKey {
    /// Parse the date segments of a bucket path.
    ///
    /// Segments must be plain ASCII digits. Missing trailing components
    /// default to the start of the larger unit (January, day 1, 00:00).
    ///
    /// # Errors
    ///
    /// Returns [`MalformedBucketPath`] for an empty or over-long segment list,
    /// a non-numeric segment, or a component outside its calendar range.
    pub fn parse<S: AsRef<str>>(segments: &[S]) -> Result<Self, MalformedBucketPath> {
        if segments.len() > MAX_COMPONENTS {
            return Err(MalformedBucketPath::new(
                segments[MAX_COMPONENTS].as_ref(),
                format!("bucket paths have at most {MAX_COMPONENTS} date components"),
            ));
        }

        let mut values = [0u32; MAX_COMPONENTS];
        for (slot, segment) in values.iter_mut().zip(segments) {
            let segment = segment.as_ref();
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MalformedBucketPath::new(segment, "not a number"));
            }
            *slot = segment
                .parse()
                .map_err(|_| MalformedBucketPath::new(segment, "number too large"))?;
        }

        Self::build(&values[..segments.len()]).map_err(|invalid| {
            let segment = match invalid.component.and_then(|idx| segments.get(idx)) {
                Some(segment) => <S as AsRef<str>>::as_ref(segment),
                None => "",
            };
            MalformedBucketPath::new(segment, invalid.reason)
        })
    }

    fn build(components: &[u32]) -> Result<Self, Invalid> {
        let granularity = Granularity::from_len(components.len()).ok_or_else(|| {
            Invalid::count(format!(
                "expected 1 to {MAX_COMPONENTS} date components, got {}",
                components.len()
            ))
        })?;

        let get = |idx: usize, default: u32| components.get(idx).copied().unwrap_or(default);
        let (year, month, day, hour, minute) =
            (get(0, 0), get(1, 1), get(2, 1), get(3, 0), get(4, 0));

        if year > MAX_YEAR {
            return Err(Invalid::at(0, format!("year out of range 0-{MAX_YEAR}")));
        }
        if !(1..=12).contains(&month) {
            return Err(Invalid::at(1, "month out of range 1-12"));
        }
        if hour > 23 {
            return Err(Invalid::at(3, "hour out of range 0-23"));
        }
        if minute > 59 {
            return Err(Invalid::at(4, "minute out of range 0-59"));
        }

        let start = NaiveDate::from_ymd_opt(year as i32, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| {
                Invalid::at(2, format!("day out of range for {year:04}-{month:02}"))
            })?;
        let end = granularity
            .next_start(start)
            .and_then(|next| next.checked_sub_signed(TimeDelta::seconds(1)))
            .ok_or_else(|| Invalid::at(0, "range ends outside the calendar"))?;

        Ok(Self {
            granularity,
            start,
            end,
        })
    }

    /// Most specific unit present.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// First second of the range.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last second of the range (inclusive).
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether the whole range lies strictly before `cutoff`.
    pub fn is_expired(&self, cutoff: NaiveDateTime) -> bool {
        self.end < cutoff
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.start;
        match self.granularity {
            Granularity::Year => write!(f, "{}", s.format("%Y")),
            Granularity::Month => write!(f, "{}", s.format("%Y/%m")),
            Granularity::Day => write!(f, "{}", s.format("%Y/%m/%d")),
            Granularity::Hour => write!(f, "{}", s.format("%Y/%m/%d/%H")),
            Granularity::Minute => write!(f, "{}", s.format("%Y/%m/%d/%H/%M")),
        }
    }
}

/// Inclusive end instant of the range named by `segments`.
///
/// # Errors
///
/// Same as [`BucketKey::parse`].
pub fn end_instant<S: AsRef<str>>(segments: &[S]) -> Result<NaiveDateTime, MalformedBucketPath> {
    BucketKey::parse(segments).map(|key| key.end_instant())
}
