//! Reflection documents.
//!
//! A reflection records which entries were analyzed, the patterns found in
//! them, and a rules proposal derived from the strong patterns. Reflections
//! are written once and never edited; ids follow the diary's
//! `(date, sequence)` scheme with the `reflection` kind.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use michi_core::{EntryId, FsError, ReflectionId};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::{PatternMatch, PatternReport, Strength};
use crate::errors::{MemoryError, Result};

const MAX_ATTEMPTS: u32 = 16;

/// A completed reflection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reflection {
    /// Reflection identifier.
    pub id: ReflectionId,
    /// When the pass ran.
    pub created_at: DateTime<Utc>,
    /// Entries analyzed, ascending.
    pub sources: Vec<EntryId>,
    /// Patterns found.
    pub patterns: PatternReport,
    /// Candidate standing rules, one `- ` line per strong pattern.
    pub proposed_rules: Option<String>,
}

/// Rules proposal: one bullet per strong pattern, or `None` without any.
pub fn propose_rules(report: &PatternReport) -> Option<String> {
    if report.strong.is_empty() {
        return None;
    }
    let mut rules = String::new();
    for m in &report.strong {
        let _ = writeln!(rules, "- {}", m.statement);
    }
    Some(rules)
}

fn strength_heading(strength: Strength) -> &'static str {
    match strength {
        Strength::Strong => "Strong Patterns (3+ occurrences)",
        Strength::Moderate => "Moderate Patterns (2 occurrences)",
        Strength::Emerging => "Emerging Patterns (1 occurrence)",
    }
}

fn push_group(out: &mut String, strength: Strength, group: &[PatternMatch]) {
    if group.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {}\n", strength_heading(strength));
    for m in group {
        let _ = writeln!(out, "- [{}] {} ({}x)", m.section.label(), m.statement, m.count);
    }
    out.push('\n');
}

/// Markdown body of a reflection.
pub fn render_reflection(reflection: &Reflection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Reflection {}\n", reflection.id);
    let _ = writeln!(
        out,
        "Created: {}",
        reflection.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, "Entries analyzed: {}\n", reflection.sources.len());

    out.push_str("## Sources\n\n");
    for id in &reflection.sources {
        let _ = writeln!(out, "- {id}");
    }
    out.push('\n');

    if reflection.patterns.is_empty() {
        out.push_str("No recurring statements found.\n\n");
    }
    for strength in [Strength::Strong, Strength::Moderate, Strength::Emerging] {
        push_group(&mut out, strength, reflection.patterns.group(strength));
    }

    if let Some(rules) = &reflection.proposed_rules {
        out.push_str("## Proposed Rules\n\n");
        out.push_str(rules);
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push('\n');
    out
}

/// Writes reflections into the reflections directory.
#[derive(Clone, Debug)]
pub struct ReflectionWriter {
    dir: PathBuf,
}

impl ReflectionWriter {
    /// Writer into `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reflections directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Existing reflection ids, ascending. A missing directory has none.
    pub fn list(&self) -> Result<Vec<ReflectionId>> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MemoryError::Reflection(FsError::new("list", &self.dir, e))),
        };
        let mut ids = Vec::new();
        for dirent in read_dir {
            let dirent =
                dirent.map_err(|e| MemoryError::Reflection(FsError::new("list", &self.dir, e)))?;
            if let Some(id) = dirent.file_name().to_str().and_then(ReflectionId::from_file_name) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Assign the next free id for `created_at`'s date and write the
    /// reflection. Returns the reflection and the file it landed in.
    pub fn write(
        &self,
        date: NaiveDate,
        created_at: DateTime<Utc>,
        sources: Vec<EntryId>,
        patterns: PatternReport,
    ) -> Result<(Reflection, PathBuf)> {
        let taken = self.list()?.iter().filter(|id| id.date() == date).count();
        let mut seq = u32::try_from(taken).unwrap_or(u32::MAX - MAX_ATTEMPTS) + 1;
        let proposed_rules = propose_rules(&patterns);
        let mut reflection = Reflection {
            id: ReflectionId::new(date, seq),
            created_at,
            sources,
            patterns,
            proposed_rules,
        };

        for _ in 0..MAX_ATTEMPTS {
            reflection.id = ReflectionId::new(date, seq);
            let body = render_reflection(&reflection);
            match michi_core::fs::write_new_atomic(&self.dir, &reflection.id.file_name(), &body) {
                Ok(path) => {
                    info!(
                        reflection_id = %reflection.id,
                        entries = reflection.sources.len(),
                        path = %path.display(),
                        "reflection written"
                    );
                    return Ok((reflection, path));
                }
                Err(e) if e.is_already_exists() => {
                    debug!(reflection_id = %reflection.id, "reflection id taken, trying next");
                    seq += 1;
                }
                Err(e) => return Err(MemoryError::Reflection(e)),
            }
        }
        Err(MemoryError::SequenceExhausted {
            date,
            attempts: MAX_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use michi_diary::EntryContent;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn entry_id(seq: u32) -> EntryId {
        EntryId::new(date(), seq)
    }

    fn report() -> PatternReport {
        let entries: Vec<EntryContent> = (0..3)
            .map(|i| EntryContent {
                preferences: vec!["uses tabs".to_string()],
                decisions: if i == 0 {
                    vec!["adopt sqlite".to_string()]
                } else {
                    Vec::new()
                },
                ..EntryContent::default()
            })
            .collect();
        analyze(&entries)
    }

    #[test]
    fn rules_come_from_strong_patterns_only() {
        assert_eq!(propose_rules(&report()).as_deref(), Some("- uses tabs\n"));
        assert_eq!(propose_rules(&PatternReport::default()), None);
    }

    #[test]
    fn render_lists_sources_groups_and_rules() {
        let patterns = report();
        let reflection = Reflection {
            id: ReflectionId::new(date(), 1),
            created_at: created(),
            sources: vec![entry_id(1), entry_id(2)],
            proposed_rules: propose_rules(&patterns),
            patterns,
        };

        let text = render_reflection(&reflection);

        assert_eq!(
            text,
            "# Reflection 2026-10-16_reflection_001\n\
             \n\
             Created: 2026-10-16T09:30:00Z\n\
             Entries analyzed: 2\n\
             \n\
             ## Sources\n\
             \n\
             - 2026-10-16_session_001\n\
             - 2026-10-16_session_002\n\
             \n\
             ## Strong Patterns (3+ occurrences)\n\
             \n\
             - [preference] uses tabs (3x)\n\
             \n\
             ## Emerging Patterns (1 occurrence)\n\
             \n\
             - [decision] adopt sqlite (1x)\n\
             \n\
             ## Proposed Rules\n\
             \n\
             - uses tabs\n"
        );
    }

    #[test]
    fn render_notes_when_nothing_recurs() {
        let reflection = Reflection {
            id: ReflectionId::new(date(), 1),
            created_at: created(),
            sources: vec![entry_id(1)],
            patterns: PatternReport::default(),
            proposed_rules: None,
        };
        let text = render_reflection(&reflection);
        assert!(text.ends_with("No recurring statements found.\n"));
        assert!(!text.contains("Proposed Rules"));
    }

    #[test]
    fn write_assigns_sequential_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReflectionWriter::new(tmp.path().join("reflections"));

        let (first, path) = writer
            .write(date(), created(), vec![entry_id(1)], report())
            .unwrap();
        let (second, _) = writer
            .write(date(), created(), vec![entry_id(2)], report())
            .unwrap();

        assert_eq!(first.id.to_string(), "2026-10-16_reflection_001");
        assert_eq!(second.id.seq(), 2);
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            render_reflection(&first)
        );
        assert_eq!(writer.list().unwrap(), vec![first.id, second.id]);
    }

    #[test]
    fn list_ignores_ledger_and_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("processed.log"), "x").unwrap();
        std::fs::write(tmp.path().join("2026-10-16_session_001.md"), "x").unwrap();
        assert!(ReflectionWriter::new(tmp.path()).list().unwrap().is_empty());
    }

    #[test]
    fn write_skips_taken_id() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("2026-10-16_reflection_002.md"), "x").unwrap();
        let writer = ReflectionWriter::new(tmp.path());

        let (reflection, _) = writer
            .write(date(), created(), vec![entry_id(1)], report())
            .unwrap();

        assert_eq!(reflection.id.seq(), 3);
    }

    #[test]
    fn write_into_file_blocked_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("reflections");
        std::fs::write(&blocker, "file").unwrap();

        let err = ReflectionWriter::new(&blocker)
            .write(date(), created(), vec![entry_id(1)], report())
            .unwrap_err();

        assert_matches!(err, MemoryError::Reflection(_));
    }
}
