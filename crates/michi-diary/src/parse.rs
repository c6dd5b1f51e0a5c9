//! Entry parsing, the inverse of [`render_entry`](crate::render::render_entry).
//!
//! Unknown `## ` headings are skipped along with their bodies. Inside a list
//! section only `- ` bullets are items. Summary lines indented by the
//! renderer to avoid reading as headings get that space stripped.

use crate::entry::{EntryContent, SUMMARY_HEADING, Section};
use crate::render::{NOT_AVAILABLE, unescape_summary_line};

#[derive(Clone, Copy)]
enum Block {
    Header,
    Summary,
    List(Section),
    Unknown,
}

fn meta_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty() && value != NOT_AVAILABLE).then(|| value.to_string())
}

/// Parse an entry file's text back into its content.
pub fn parse_entry(text: &str) -> EntryContent {
    let mut content = EntryContent::default();
    let mut summary: Vec<&str> = Vec::new();
    let mut block = Block::Header;

    for line in text.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            block = if heading.trim() == SUMMARY_HEADING {
                Block::Summary
            } else {
                Section::from_heading(heading).map_or(Block::Unknown, Block::List)
            };
            continue;
        }
        match block {
            Block::Header => {
                if let Some(v) = line.strip_prefix("Project:") {
                    content.project = meta_value(v);
                } else if let Some(v) = line.strip_prefix("Branch:") {
                    content.branch = meta_value(v);
                }
            }
            Block::Summary => summary.push(unescape_summary_line(line)),
            Block::List(section) => {
                if let Some(item) = line.strip_prefix("- ") {
                    let item = item.trim_end();
                    if !item.is_empty() {
                        content.section_mut(section).push(item.to_string());
                    }
                }
            }
            Block::Unknown => {}
        }
    }

    let summary = summary.join("\n");
    let summary = summary.trim();
    if !summary.is_empty() {
        content.summary = Some(summary.to_string());
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_entry;
    use chrono::NaiveDate;
    use michi_core::EntryId;

    #[test]
    fn parses_rendered_entry() {
        let content = EntryContent {
            project: Some("/work/app".to_string()),
            branch: Some("feature/x".to_string()),
            summary: Some("Two line\nsummary".to_string()),
            work_done: vec!["a".to_string(), "b".to_string()],
            decisions: vec!["Use PostgreSQL for database".to_string()],
            preferences: vec!["Use Black for formatting".to_string()],
            challenges: vec!["flaky test".to_string()],
            patterns: vec!["asks for TDD".to_string()],
        };
        let id = EntryId::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 3);
        assert_eq!(parse_entry(&render_entry(&id, &content)), content);
    }

    #[test]
    fn summary_with_heading_lines_stays_summary() {
        let content = EntryContent {
            summary: Some("## Decisions Made\n- Use tabs\n ## Preferences Learned\nend".to_string()),
            preferences: vec!["real".to_string()],
            ..EntryContent::default()
        };
        let id = EntryId::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 1);

        let parsed = parse_entry(&render_entry(&id, &content));

        assert_eq!(parsed, content);
        assert!(parsed.decisions.is_empty());
    }

    #[test]
    fn placeholder_metadata_becomes_none() {
        let parsed = parse_entry("Project: N/A\nBranch: N/A\nDate: 2026-01-01\nSession: 001\n");
        assert_eq!(parsed, EntryContent::default());
    }

    #[test]
    fn legacy_heading_and_unknown_sections() {
        let text = "\
Project: /p
Branch: main

## Preferences Observed

- Prefer pytest over unittest

## Notes

- not a statement

## Decisions Made

- Use JWT for authentication
some prose that is not a bullet
-not a bullet either
";
        let parsed = parse_entry(text);
        assert_eq!(parsed.preferences, vec!["Prefer pytest over unittest"]);
        assert_eq!(parsed.decisions, vec!["Use JWT for authentication"]);
        assert!(parsed.work_done.is_empty());
        assert!(parsed.summary.is_none());
    }

    #[test]
    fn empty_text() {
        assert_eq!(parse_entry(""), EntryContent::default());
    }

    #[test]
    fn duplicate_items_kept() {
        let parsed = parse_entry("## Decisions Made\n\n- same\n- same\n");
        assert_eq!(parsed.decisions, vec!["same", "same"]);
    }
}
