//! # michi-hooks
//!
//! Session lifecycle hooks for the memory engine.
//!
//! - [`CaptureTrigger`]: counts turns per session and answers, at most once
//!   per session, that enough has happened to capture a diary entry.
//! - [`on_session_end`]: drops the session's state and runs the retention
//!   sweep.
//!
//! ## Fail-Open
//!
//! The session-end hook never fails its caller. Errors are logged at warn
//! and an empty report is returned. The capture trigger does return errors;
//! callers at a hook boundary decide whether to surface them.

#![deny(unsafe_code)]

pub mod capture;
pub mod cleanup;
pub mod errors;
pub mod session_state;

pub use capture::CaptureTrigger;
pub use cleanup::on_session_end;
pub use errors::{HookError, Result};
pub use session_state::{SessionState, SessionStateStore};
