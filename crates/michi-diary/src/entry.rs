//! Entry content model.

use michi_core::EntryId;
use serde::{Deserialize, Serialize};

/// Heading of the free-text summary section.
pub const SUMMARY_HEADING: &str = "Summary";

/// A list-valued entry section.
///
/// Declaration order is the order sections are rendered in, and the order
/// pattern reports group by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Work items completed.
    WorkDone,
    /// Decisions made.
    Decisions,
    /// Preferences learned about the user.
    Preferences,
    /// Problems encountered.
    Challenges,
    /// Patterns the session noticed.
    Patterns,
}

impl Section {
    /// Every section, in render order.
    pub const ALL: [Self; 5] = [
        Self::WorkDone,
        Self::Decisions,
        Self::Preferences,
        Self::Challenges,
        Self::Patterns,
    ];

    /// Markdown heading text (without `## `).
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::WorkDone => "Work Done",
            Self::Decisions => "Decisions Made",
            Self::Preferences => "Preferences Learned",
            Self::Challenges => "Challenges",
            Self::Patterns => "Patterns Observed",
        }
    }

    /// Resolve a heading back to its section.
    ///
    /// `Preferences Observed` is accepted for entries written by older tools.
    #[must_use]
    pub fn from_heading(heading: &str) -> Option<Self> {
        match heading.trim() {
            "Work Done" => Some(Self::WorkDone),
            "Decisions Made" => Some(Self::Decisions),
            "Preferences Learned" | "Preferences Observed" => Some(Self::Preferences),
            "Challenges" => Some(Self::Challenges),
            "Patterns Observed" => Some(Self::Patterns),
            _ => None,
        }
    }

    /// Short lowercase label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::WorkDone => "work",
            Self::Decisions => "decision",
            Self::Preferences => "preference",
            Self::Challenges => "challenge",
            Self::Patterns => "pattern",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What a session wants recorded. Every section is optional.
///
/// Deserializes from the JSON the capture command hands over; missing keys
/// are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryContent {
    /// Working directory of the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Source-control branch of the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Free-text summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Work items completed.
    #[serde(alias = "work", skip_serializing_if = "Vec::is_empty")]
    pub work_done: Vec<String>,
    /// Decisions made.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<String>,
    /// Preferences learned.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<String>,
    /// Challenges encountered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub challenges: Vec<String>,
    /// Observed patterns.
    #[serde(alias = "observed_patterns", skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

impl EntryContent {
    /// Items of a list section.
    #[must_use]
    pub fn section(&self, section: Section) -> &[String] {
        match section {
            Section::WorkDone => &self.work_done,
            Section::Decisions => &self.decisions,
            Section::Preferences => &self.preferences,
            Section::Challenges => &self.challenges,
            Section::Patterns => &self.patterns,
        }
    }

    /// Mutable items of a list section.
    pub fn section_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::WorkDone => &mut self.work_done,
            Section::Decisions => &mut self.decisions,
            Section::Preferences => &mut self.preferences,
            Section::Challenges => &mut self.challenges,
            Section::Patterns => &mut self.patterns,
        }
    }

    /// Whether no section carries data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.as_deref().is_none_or(|s| s.trim().is_empty())
            && Section::ALL.iter().all(|s| self.section(*s).is_empty())
    }
}

/// An entry read back from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiaryEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Parsed content.
    pub content: EntryContent,
}
