//! Runtime version identifiers.
//!
//! Versions are dotted sequences of numeric and alphabetic segments, ordered
//! the way gem versions are: numeric segments compare numerically, missing
//! trailing segments count as zero, and an alphabetic segment marks a
//! pre-release that sorts before the release it precedes
//! (`0.5.10587.rc1 < 0.5.10587 < 0.5.10588`).

use crate::error::{GemRbiError, GemRbiResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Segment {
    fn compare(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            // a release segment outranks any pre-release tag
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
        }
    }
}

/// A totally ordered version of the downstream type-checking runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionIdentifier {
    raw: String,
    segments: Vec<Segment>,
}

impl VersionIdentifier {
    pub fn parse(input: &str) -> GemRbiResult<Self> {
        let unsupported = || GemRbiError::UnsupportedVersion {
            value: input.to_string(),
        };

        let raw = input.trim();
        if raw.is_empty() || !raw.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(unsupported());
        }

        let mut segments = Vec::new();
        for part in raw.split(['.', '-']) {
            if part.is_empty() {
                return Err(unsupported());
            }
            segments.extend(split_runs(part).ok_or_else(unsupported)?);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Whether this version carries a pre-release tag.
    pub fn is_prerelease(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Text(_)))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Splits `10587rc1` into `[10587, "rc", 1]`; rejects anything that is not
/// ASCII alphanumeric.
fn split_runs(part: &str) -> Option<Vec<Segment>> {
    let mut runs: Vec<Segment> = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = None;

    for c in part.chars() {
        if !c.is_ascii_alphanumeric() {
            return None;
        }
        let is_digit = c.is_ascii_digit();
        if current_is_digit.is_some_and(|d| d != is_digit) {
            runs.push(finish_run(&current, current_is_digit == Some(true))?);
            current.clear();
        }
        current.push(c.to_ascii_lowercase());
        current_is_digit = Some(is_digit);
    }
    runs.push(finish_run(&current, current_is_digit == Some(true))?);
    Some(runs)
}

fn finish_run(run: &str, numeric: bool) -> Option<Segment> {
    if numeric {
        run.parse().ok().map(Segment::Number)
    } else {
        Some(Segment::Text(run.to_string()))
    }
}

impl Ord for VersionIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment::Number(0);
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&zero);
            let b = other.segments.get(i).unwrap_or(&zero);
            match a.compare(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionIdentifier {}

impl FromStr for VersionIdentifier {
    type Err = GemRbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionIdentifier {
    type Error = GemRbiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionIdentifier> for String {
    fn from(version: VersionIdentifier) -> Self {
        version.raw
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
