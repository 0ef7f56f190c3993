//! In-session planning state.
//!
//! [`SessionPlanner`] holds the exercise list the user is about to perform,
//! the configuration it was built for and the cached exercise pool. It is
//! owned by the caller and passed around explicitly.

use crate::catalog::ExerciseSource;
use crate::selector;
use crate::workout::{CuePlayer, Workout, WorkoutTiming};
use crate::{Exercise, Result, SessionConfig, SessionExercise};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct SessionPlanner {
    exercises: Vec<SessionExercise>,
    pool: Vec<Exercise>,
    config: Option<SessionConfig>,
    session_id: Option<Uuid>,
}

impl SessionPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the exercise list in line with `config`
    ///
    /// The pool is fetched from `source` the first time only. Selection runs
    /// again only when the exercise count, difficulty or exercise duration
    /// changed; a pause-only change just updates the stored configuration.
    /// Returns whether the exercise list was recomputed.
    pub fn initialize(&mut self, config: SessionConfig, source: &dyn ExerciseSource) -> Result<bool> {
        let previous = self.config.replace(config);
        let needs_selection = match previous {
            None => true,
            Some(prev) => {
                prev.exercise_count() != config.exercise_count()
                    || prev.difficulty != config.difficulty
                    || prev.exercise_duration != config.exercise_duration
            }
        };

        if !needs_selection {
            return Ok(false);
        }

        if self.pool.is_empty() {
            match source.fetch_exercises() {
                Ok(pool) => {
                    tracing::info!("Cached {} exercises", pool.len());
                    self.pool = pool;
                }
                Err(e) => {
                    tracing::error!("Failed to fetch exercises: {}", e);
                    self.exercises.clear();
                    self.config = None;
                    return Err(e);
                }
            }
        }

        let mut selected = selector::select_exercises(
            &self.pool,
            &self.exercises,
            config.difficulty,
            config.exercise_count(),
            config.exercise_duration,
        );

        let duration_changed =
            previous.is_some_and(|prev| prev.exercise_duration != config.exercise_duration);
        if duration_changed {
            for entry in &mut selected {
                entry.duration = config.exercise_duration;
            }
        }

        tracing::debug!(
            "Planned {} of {} exercises",
            selected.len(),
            config.exercise_count()
        );
        self.exercises = selected;
        Ok(true)
    }

    /// Load an existing exercise list, e.g. to replay a past session
    pub fn populate(&mut self, exercises: Vec<SessionExercise>, config: SessionConfig) {
        self.exercises = exercises;
        self.config = Some(config);
    }

    /// Forget the planned session. The cached pool is kept.
    pub fn clear(&mut self) {
        self.exercises.clear();
        self.config = None;
        self.session_id = None;
    }

    pub fn set_session_id(&mut self, session_id: Uuid) {
        self.session_id = Some(session_id);
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn pool(&self) -> &[Exercise] {
        &self.pool
    }

    pub fn move_exercise_up(&mut self, index: usize) -> bool {
        selector::move_exercise_up(&mut self.exercises, index)
    }

    pub fn move_exercise_down(&mut self, index: usize) -> bool {
        selector::move_exercise_down(&mut self.exercises, index)
    }

    pub fn replace_exercise(&mut self, index: usize) -> bool {
        selector::replace_exercise(&mut self.exercises, &self.pool, index)
    }

    /// A workout over the planned exercises
    pub fn build_workout<P: CuePlayer>(&self, timing: WorkoutTiming, player: P) -> Workout<P> {
        let pause_duration = self.config.map_or(0, |c| c.pause_duration);
        Workout::new(self.exercises.clone(), pause_duration, timing, player)
    }
}
