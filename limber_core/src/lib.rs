#![forbid(unsafe_code)]

//! Core domain model and business logic for the Limber stretching system.
//!
//! This crate provides:
//! - Domain types (exercises, session configuration, session records)
//! - Exercise catalog and sided-exercise helpers
//! - Exercise selection for a session
//! - Countdowns and the workout progression state machine
//! - Persistence (session journal, preferences)
//! - Statistics, streaks and session titles

pub mod types;
pub mod error;
pub mod sided;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod selector;
pub mod countdown;
pub mod workout;
pub mod planner;
pub mod journal;
pub mod preferences;
pub mod stats;
pub mod title;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{get_default_catalog, BuiltinCatalog, ExerciseSource, JsonFileSource};
pub use config::Config;
pub use selector::{move_exercise_down, move_exercise_up, replace_exercise, select_exercises};
pub use countdown::Countdown;
pub use workout::{
    Cue, CuePlayer, Phase, SilentPlayer, Transition, Workout, WorkoutSnapshot, WorkoutTiming,
};
pub use planner::SessionPlanner;
pub use journal::{CreateSessionInput, SessionJournal, SessionRepository};
pub use preferences::{Language, Preferences};
pub use stats::{activity_calendar, daily_activity, streaks, user_session_stats, Streaks};
pub use title::generate_session_title;
