//! Entry rendering.
//!
//! Layout:
//!
//! ```text
//! Project: /path/to/project
//! Branch: main
//! Date: 2026-10-16
//! Session: 001
//!
//! ## Summary
//!
//! <summary text>
//!
//! ## Work Done
//!
//! - item
//! ```
//!
//! followed by `Decisions Made`, `Preferences Learned`, `Challenges`, and
//! `Patterns Observed` in that order. A section with no data is omitted.
//!
//! Summary lines that would read as a heading (`## ` after any leading
//! spaces) are written with one extra leading space, which the parser
//! removes again.

use michi_core::EntryId;

use crate::entry::{EntryContent, SUMMARY_HEADING, Section};

/// Placeholder for missing header metadata.
pub const NOT_AVAILABLE: &str = "N/A";

/// Collapse an item to one line so it parses back as a single bullet.
pub(crate) fn flatten_item(item: &str) -> String {
    item.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn looks_like_heading(line: &str) -> bool {
    line.trim_start_matches(' ').starts_with("## ")
}

/// Indent a summary line by one space if it would otherwise start a section.
pub(crate) fn escape_summary_line(line: &str) -> String {
    if looks_like_heading(line) {
        format!(" {line}")
    } else {
        line.to_string()
    }
}

/// Inverse of [`escape_summary_line`].
pub(crate) fn unescape_summary_line(line: &str) -> &str {
    match line.strip_prefix(' ') {
        Some(rest) if looks_like_heading(rest) => rest,
        _ => line,
    }
}

/// Render `content` for entry `id`.
pub fn render_entry(id: &EntryId, content: &EntryContent) -> String {
    let mut lines: Vec<String> = Vec::new();

    let meta = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };
    lines.push(format!("Project: {}", meta(&content.project)));
    lines.push(format!("Branch: {}", meta(&content.branch)));
    lines.push(format!("Date: {}", id.date().format("%Y-%m-%d")));
    lines.push(format!("Session: {:03}", id.seq()));
    lines.push(String::new());

    if let Some(summary) = content.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        lines.push(format!("## {SUMMARY_HEADING}"));
        lines.push(String::new());
        lines.extend(summary.lines().map(escape_summary_line));
        lines.push(String::new());
    }

    for section in Section::ALL {
        let items: Vec<String> = content
            .section(section)
            .iter()
            .map(|item| flatten_item(item))
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            continue;
        }
        lines.push(format!("## {}", section.heading()));
        lines.push(String::new());
        lines.extend(items.into_iter().map(|item| format!("- {item}")));
        lines.push(String::new());
    }

    let mut out = lines.join("\n").trim_end().to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn id() -> EntryId {
        EntryId::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 1)
    }

    fn sample() -> EntryContent {
        EntryContent {
            project: Some("/Users/test/project".to_string()),
            branch: Some("main".to_string()),
            summary: Some("Implemented user authentication".to_string()),
            work_done: vec![
                "Added login endpoint".to_string(),
                "Created user model".to_string(),
            ],
            decisions: vec!["Use JWT for authentication".to_string()],
            preferences: vec!["Prefer pytest over unittest".to_string()],
            challenges: Vec::new(),
            patterns: Vec::new(),
        }
    }

    #[test]
    fn renders_full_layout() {
        let expected = "\
Project: /Users/test/project
Branch: main
Date: 2026-10-16
Session: 001

## Summary

Implemented user authentication

## Work Done

- Added login endpoint
- Created user model

## Decisions Made

- Use JWT for authentication

## Preferences Learned

- Prefer pytest over unittest
";
        assert_eq!(render_entry(&id(), &sample()), expected);
    }

    #[test]
    fn omits_empty_sections() {
        let content = EntryContent {
            summary: Some("Simple change".to_string()),
            work_done: vec!["Updated README".to_string()],
            ..EntryContent::default()
        };
        let out = render_entry(&id(), &content);
        assert!(out.contains("## Summary"));
        assert!(out.contains("## Work Done"));
        assert!(!out.contains("## Decisions Made"));
        assert!(!out.contains("## Preferences Learned"));
        assert!(!out.contains("## Challenges"));
        assert!(!out.contains("## Patterns Observed"));
    }

    #[test]
    fn missing_metadata_is_placeholder() {
        let out = render_entry(&id(), &EntryContent::default());
        assert_eq!(
            out,
            "Project: N/A\nBranch: N/A\nDate: 2026-10-16\nSession: 001\n"
        );
    }

    #[test]
    fn blank_items_dropped_and_multiline_flattened() {
        let content = EntryContent {
            challenges: vec!["  ".to_string(), "slow\n  tests".to_string()],
            patterns: vec![String::new()],
            ..EntryContent::default()
        };
        let out = render_entry(&id(), &content);
        assert!(out.contains("## Challenges\n\n- slow tests\n"));
        assert!(!out.contains("## Patterns Observed"));
    }

    #[test]
    fn summary_headings_are_indented() {
        let content = EntryContent {
            summary: Some("Intro\n## Decisions Made\n  ## Notes\n##tight".to_string()),
            ..EntryContent::default()
        };
        let out = render_entry(&id(), &content);
        assert!(out.ends_with("## Summary\n\nIntro\n ## Decisions Made\n   ## Notes\n##tight\n"));
        assert_eq!(out.matches("\n## ").count(), 1);
    }

    #[test]
    fn summary_line_escaping_inverts() {
        for line in ["## x", " ## x", "  ## x", " plain", "##x", ""] {
            assert_eq!(unescape_summary_line(&escape_summary_line(line)), line);
        }
        assert_eq!(unescape_summary_line(" plain"), " plain");
    }

    #[test]
    fn session_number_padded() {
        let id = EntryId::new(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), 12);
        assert!(render_entry(&id, &EntryContent::default()).contains("Session: 012"));
    }
}
