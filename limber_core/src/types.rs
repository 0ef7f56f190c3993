//! Core domain types for the Limber stretching system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their eligible difficulties
//! - Exercises placed into a session with an assigned duration
//! - Session configuration and the derived exercise count
//! - Persisted session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Difficulty level an exercise may be eligible for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(format!("difficulty must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.level()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// A stretching exercise from the pool
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub image: String,
    pub difficulties: Vec<Difficulty>,
}

impl Exercise {
    /// Whether this exercise is eligible for the given difficulty
    pub fn supports(&self, difficulty: Difficulty) -> bool {
        self.difficulties.contains(&difficulty)
    }
}

/// An exercise placed into a session, with its assigned duration in seconds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionExercise {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub duration: u32,
}

impl SessionExercise {
    pub fn new(exercise: Exercise, duration: u32) -> Self {
        Self { exercise, duration }
    }

    pub fn id(&self) -> &str {
        &self.exercise.id
    }
}

// ============================================================================
// Session Configuration
// ============================================================================

/// The four scalars a user picks before starting a session (all in seconds,
/// except difficulty)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub effort_duration: u32,
    pub pause_duration: u32,
    pub exercise_duration: u32,
    pub difficulty: Difficulty,
}

impl SessionConfig {
    /// Number of exercises that fit in the effort duration.
    ///
    /// Zero when `exercise_duration` is zero.
    pub fn exercise_count(&self) -> usize {
        if self.exercise_duration == 0 {
            return 0;
        }
        (self.effort_duration / self.exercise_duration) as usize
    }

    /// Expected wall time for `count` exercises with rests between them
    pub fn total_duration_for(&self, count: usize) -> u32 {
        let count = count as u32;
        if count == 0 {
            return 0;
        }
        count
            .saturating_mul(self.exercise_duration)
            .saturating_add((count - 1).saturating_mul(self.pause_duration))
    }

    /// Expected wall time for the derived exercise count
    pub fn total_duration(&self) -> u32 {
        self.total_duration_for(self.exercise_count())
    }
}

// ============================================================================
// Session Record
// ============================================================================

/// A persisted stretching session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub number_of_exercises: u32,
    pub exercise_duration: u32,
    pub pause_duration: u32,
    pub total_duration: u32,
    pub favorite: bool,
    pub exercises: Vec<SessionExercise>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Seconds spent stretching, rests excluded
    pub fn effort_duration(&self) -> u32 {
        self.exercises.iter().map(|e| e.duration).sum()
    }
}
