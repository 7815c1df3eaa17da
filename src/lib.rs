//! FocusFlow - weekly time-block tracker
//!
//! A recurring set of named time blocks per weekday. The library works out which
//! block is happening now, which comes next and how far the current one has
//! progressed, and clears completion flags once at the start of every week.
//!
//! # Module Organization
//!
//! - `models`: blocks, weekdays, "HH:MM" times, legacy record normalization
//! - `store`: in-memory task collection
//! - `week`: week-start arithmetic and the last-reset tracker
//! - `schedule`: active/next/progress resolution
//! - `reset`: weekly completion reset and load-time migration
//! - `planner`: ties store, tracker, clock and storage together
//! - `storage`: JSON file persistence
//! - `clock`: injectable time source
//! - `commands`, `tui`: command line and terminal front ends

pub mod clock;
pub mod commands;
pub mod error;
pub mod models;
pub mod planner;
pub mod reset;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod tui;
pub mod week;

pub use error::{Error, Result};
