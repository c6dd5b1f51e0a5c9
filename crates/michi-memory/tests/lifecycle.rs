//! End-to-end lifecycle over one memory root: configure, capture entries,
//! reflect, recover from a failed ledger append, and expire old entries.

use std::time::{Duration, SystemTime};

use assert_matches::assert_matches;
use chrono::{Local, NaiveDate, TimeZone};
use filetime::FileTime;
use michi_core::MemPaths;
use michi_diary::{DiaryStore, DiaryWriter, EntryContent, RetentionSweeper};
use michi_memory::{PassOutcome, Reflector};
use michi_settings::load_config;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn session(preferences: &[&str]) -> EntryContent {
    EntryContent {
        project: Some("/work/app".to_string()),
        branch: Some("main".to_string()),
        summary: Some("Worked on the app".to_string()),
        work_done: vec!["Refactored module".to_string()],
        preferences: preferences.iter().map(ToString::to_string).collect(),
        ..EntryContent::default()
    }
}

#[test]
fn capture_reflect_retry_and_expire() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = MemPaths::new(tmp.path());

    // First run materializes the default configuration.
    let config = load_config(&paths.config_path()).unwrap();
    assert_eq!(config.auto_reflect_threshold, 5);
    assert!(paths.config_path().exists());

    let writer = DiaryWriter::new(paths.diary_dir());
    let reflector = Reflector::new(&paths);
    let batch = [
        session(&["uses tabs", "writes tests first"]),
        session(&["uses tabs"]),
        session(&["uses tabs", "writes tests first"]),
        session(&["likes small commits"]),
        session(&[]),
    ];
    let mut ids = Vec::new();
    for content in &batch {
        ids.push(writer.create_entry_on(day(10), content).unwrap());
    }
    assert_eq!(ids[4].to_string(), "2026-10-10_session_005");

    let status = reflector.status(config.auto_reflect_threshold).unwrap();
    assert_eq!(status.pending, 5);
    assert!(status.should_reflect);

    // Ledger path blocked: the reflection is still produced, marking fails.
    std::fs::create_dir_all(paths.ledger_path()).unwrap();
    let now = Local.with_ymd_and_hms(2026, 10, 10, 18, 0, 0).unwrap();
    let pass = assert_matches!(reflector.run_at(now).unwrap(), PassOutcome::Reflected(p) => p);

    assert!(pass.marking.is_err());
    assert_eq!(pass.reflection.sources, ids);
    let strong: Vec<&str> = pass
        .reflection
        .patterns
        .strong
        .iter()
        .map(|m| m.statement.as_str())
        .collect();
    assert!(strong.contains(&"uses tabs"));
    assert!(strong.contains(&"Refactored module"));
    assert_eq!(pass.reflection.patterns.moderate[0].statement, "writes tests first");
    let written = std::fs::read_to_string(&pass.path).unwrap();
    assert!(written.contains("## Proposed Rules"));
    assert!(written.contains("- uses tabs"));
    assert_eq!(reflector.pending().unwrap().len(), 5);

    // Unblock and retry the marking step alone.
    std::fs::remove_dir(paths.ledger_path()).unwrap();
    reflector.mark_processed(&pass.reflection.sources).unwrap();
    assert!(reflector.pending().unwrap().is_empty());
    assert_matches!(reflector.run_at(now).unwrap(), PassOutcome::NothingToDo);

    // A new session is picked up by the next pass on its own.
    let late = writer.create_entry_on(day(11), &session(&["uses tabs"])).unwrap();
    let next = assert_matches!(reflector.run_at(now).unwrap(), PassOutcome::Reflected(p) => p);
    assert!(next.is_recorded());
    assert_eq!(next.reflection.sources, vec![late]);
    assert_eq!(next.reflection.id.seq(), 2);

    // Age the first batch past retention; reflections and ledger survive.
    let store = DiaryStore::new(paths.diary_dir());
    let sweep_now = SystemTime::now();
    for id in &ids {
        let aged = FileTime::from_system_time(sweep_now - DAY * (config.retention_days + 1));
        filetime::set_file_mtime(store.path_of(id), aged).unwrap();
    }
    let report = RetentionSweeper::new(paths.diary_dir())
        .with_state_dir(paths.state_dir())
        .sweep_at(config.retention_days, sweep_now)
        .unwrap();

    assert_eq!(report.entries_deleted, 5);
    assert_eq!(store.list().unwrap(), vec![late]);
    assert!(pass.path.exists());
    assert!(next.path.exists());
    assert!(paths.ledger_path().exists());
    // Ledger still lists deleted entries; nothing new is pending.
    assert!(reflector.pending().unwrap().is_empty());
}

#[test]
fn entries_round_trip_through_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = MemPaths::new(tmp.path());
    let content = session(&["prefers explicit errors"]);

    let id = DiaryWriter::new(paths.diary_dir())
        .create_entry_on(day(12), &content)
        .unwrap();
    let entry = DiaryStore::new(paths.diary_dir()).read(&id).unwrap();

    assert_eq!(entry.id, id);
    assert_eq!(entry.content, content);
}
