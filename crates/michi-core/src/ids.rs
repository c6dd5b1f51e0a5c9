//! Dated composite keys.
//!
//! Diary entries and reflections are identified by `(date, sequence)` pairs
//! rendered as `YYYY-MM-DD_<kind>_NNN`. The sequence is 1-based and
//! zero-padded to at least three digits, so lexical order of the rendered
//! form matches `(date, sequence)` order up to sequence 999.
//!
//! Keys serialize as their rendered string.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::KeyParseError;

/// File extension shared by entries and reflections.
pub const MARKDOWN_EXT: &str = "md";

static DATED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})_([a-z]+)_(\d{3,})$").expect("valid regex")
});

/// Split a rendered key into its date and sequence, checking the kind marker.
fn parse_dated_key(input: &str, kind: &'static str) -> Result<(NaiveDate, u32), KeyParseError> {
    let malformed = || KeyParseError::Malformed {
        kind,
        input: input.to_string(),
    };
    let caps = DATED_KEY.captures(input).ok_or_else(malformed)?;
    if &caps[2] != kind {
        return Err(malformed());
    }
    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").map_err(|_| {
        KeyParseError::InvalidDate {
            kind,
            input: input.to_string(),
        }
    })?;
    let seq: u32 = caps[3].parse().map_err(|_| malformed())?;
    if seq == 0 {
        return Err(KeyParseError::ZeroSequence {
            kind,
            input: input.to_string(),
        });
    }
    Ok((date, seq))
}

macro_rules! dated_key {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            date: NaiveDate,
            seq: u32,
        }

        impl $name {
            /// Kind marker embedded in the rendered key.
            pub const KIND: &'static str = $kind;

            /// Create a key. `seq` is 1-based; zero is bumped to 1.
            #[must_use]
            pub fn new(date: NaiveDate, seq: u32) -> Self {
                Self {
                    date,
                    seq: seq.max(1),
                }
            }

            /// Calendar date component.
            #[must_use]
            pub fn date(&self) -> NaiveDate {
                self.date
            }

            /// 1-based sequence within the date.
            #[must_use]
            pub fn seq(&self) -> u32 {
                self.seq
            }

            /// File name (`<key>.md`) under which this key is stored.
            #[must_use]
            pub fn file_name(&self) -> String {
                format!("{self}.{MARKDOWN_EXT}")
            }

            /// Parse a key back from a file name. Returns `None` for files
            /// that are not `<key>.md`.
            #[must_use]
            pub fn from_file_name(name: &str) -> Option<Self> {
                name.strip_suffix(".md")?.parse().ok()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{}_{}_{:03}",
                    self.date.format("%Y-%m-%d"),
                    Self::KIND,
                    self.seq
                )
            }
        }

        impl FromStr for $name {
            type Err = KeyParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (date, seq) = parse_dated_key(s, Self::KIND)?;
                Ok(Self { date, seq })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

dated_key! {
    /// Identifier of a diary entry: `YYYY-MM-DD_session_NNN`.
    EntryId, "session"
}

dated_key! {
    /// Identifier of a reflection: `YYYY-MM-DD_reflection_NNN`.
    ReflectionId, "reflection"
}
