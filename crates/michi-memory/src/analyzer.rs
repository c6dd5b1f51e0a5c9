//! Recurring-statement extraction.
//!
//! A statement is one bullet in one section of an entry. Statements are
//! matched by exact string equality and only within the same section: the
//! same words under "Decisions Made" and under "Preferences Learned" are two
//! different patterns. Every occurrence counts, including repeats inside a
//! single entry.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use michi_diary::{EntryContent, Section};
use serde::{Deserialize, Serialize};

/// Recurrence class of a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Seen once.
    Emerging,
    /// Seen twice.
    Moderate,
    /// Seen three or more times.
    Strong,
}

impl Strength {
    /// Class for an occurrence count; `None` for zero.
    pub fn classify(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Emerging),
            2 => Some(Self::Moderate),
            _ => Some(Self::Strong),
        }
    }
}

/// One statement and how often it appeared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Section the statement appeared under.
    pub section: Section,
    /// Statement text.
    pub statement: String,
    /// Occurrences across the analyzed entries.
    pub count: usize,
}

/// Patterns grouped by strength.
///
/// `strong` is ordered by count (highest first); ties, and the other two
/// groups, are ordered by section then statement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Statements seen three or more times.
    pub strong: Vec<PatternMatch>,
    /// Statements seen exactly twice.
    pub moderate: Vec<PatternMatch>,
    /// Statements seen once.
    pub emerging: Vec<PatternMatch>,
}

impl PatternReport {
    /// Patterns of the given strength.
    pub fn group(&self, strength: Strength) -> &[PatternMatch] {
        match strength {
            Strength::Strong => &self.strong,
            Strength::Moderate => &self.moderate,
            Strength::Emerging => &self.emerging,
        }
    }

    /// Whether no statements were found at all.
    pub fn is_empty(&self) -> bool {
        self.strong.is_empty() && self.moderate.is_empty() && self.emerging.is_empty()
    }

    /// Distinct patterns across all groups.
    pub fn len(&self) -> usize {
        self.strong.len() + self.moderate.len() + self.emerging.len()
    }
}

/// Count and classify the statements in `entries`.
///
/// The result does not depend on the order of `entries`.
pub fn analyze<'a, I>(entries: I) -> PatternReport
where
    I: IntoIterator<Item = &'a EntryContent>,
{
    let mut counts: BTreeMap<(Section, &'a str), usize> = BTreeMap::new();
    for content in entries {
        for section in Section::ALL {
            for item in content.section(section) {
                if item.is_empty() {
                    continue;
                }
                *counts.entry((section, item.as_str())).or_default() += 1;
            }
        }
    }

    let mut report = PatternReport::default();
    for ((section, statement), count) in counts {
        let found = PatternMatch {
            section,
            statement: statement.to_string(),
            count,
        };
        match Strength::classify(count) {
            Some(Strength::Strong) => report.strong.push(found),
            Some(Strength::Moderate) => report.moderate.push(found),
            Some(Strength::Emerging) => report.emerging.push(found),
            None => {}
        }
    }
    // Stable: equal counts keep (section, statement) order from the map.
    report.strong.sort_by_key(|m| Reverse(m.count));
    report
}
