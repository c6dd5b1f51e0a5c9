//! # michi-memory
//!
//! Distills recurring statements from unprocessed diary entries into
//! reflections.
//!
//! Pipeline, run by [`Reflector::run`]:
//! 1. **Select**: diary entries absent from the [`Ledger`] ([`unprocessed`])
//! 2. **Analyze**: count statements per section, classify by recurrence
//!    ([`analyze`]): 3+ strong, 2 moderate, 1 emerging
//! 3. **Record**: write a [`Reflection`], then append the consumed entry
//!    ids to the ledger
//!
//! ## Ledger semantics
//!
//! The ledger only grows. Ids whose entries were since deleted by retention
//! stay listed and are harmless. An unreadable ledger counts as empty. When
//! appending fails after the reflection was written, the pass still returns
//! the reflection together with the marking error so the caller can retry
//! [`Reflector::mark_processed`] without re-analyzing.

#![deny(unsafe_code)]

pub mod analyzer;
pub mod errors;
pub mod ledger;
pub mod reflection;
pub mod reflector;

pub use analyzer::{PatternMatch, PatternReport, Strength, analyze};
pub use errors::{MemoryError, Result};
pub use ledger::{Ledger, ProcessedSet, unprocessed};
pub use reflection::{Reflection, ReflectionWriter, propose_rules, render_reflection};
pub use reflector::{PassOutcome, ReflectStatus, ReflectionPass, Reflector};
