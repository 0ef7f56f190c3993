//! Workout progression state machine.
//!
//! A [`Workout`] walks one session through its phases:
//!
//! ```text
//! Beginning --lead-in done--> Exercising --time up, more left--> Resting
//!                                 ^                                 |
//!                                 +-----------rest done-------------+
//! Exercising --time up, last exercise--> Ended
//! Beginning | Exercising | Resting <--pause/resume--> Paused
//! ```
//!
//! The main countdown drives both the lead-in and each exercise; the rest
//! countdown drives the pauses between exercises. Only one of them runs at a
//! time. The owner calls [`Workout::tick`] once per second (or whatever interval
//! it chooses) and renders [`Workout::snapshot`].

use crate::{Countdown, Result, SessionExercise};
use std::fmt;

/// Phase of a workout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Beginning,
    Exercising,
    Resting,
    Paused,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Beginning => "beginning",
            Phase::Exercising => "exercising",
            Phase::Resting => "resting",
            Phase::Paused => "paused",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Sound cues fired on phase changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    StartSession,
    EndSession,
    StartRest,
    /// Fired shortly before a rest ends so the sound finishes with it
    EndRest,
}

/// Audio collaborator. Errors are logged and otherwise ignored.
pub trait CuePlayer {
    fn play(&mut self, cue: Cue) -> Result<()>;
}

/// Discards every cue
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&mut self, _cue: Cue) -> Result<()> {
        Ok(())
    }
}

/// Fixed timing parameters of a workout, in ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkoutTiming {
    pub lead_in: u32,
    pub lead_in_cap: u32,
    pub end_rest_cue_lead: u32,
}

impl Default for WorkoutTiming {
    fn default() -> Self {
        Self {
            lead_in: 5,
            lead_in_cap: 60,
            end_rest_cue_lead: 2,
        }
    }
}

/// A phase change produced by [`Workout::tick`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    /// Index of the current exercise after the transition
    pub index: usize,
}

/// Everything a front-end needs to draw one frame
#[derive(Clone, Copy, Debug)]
pub struct WorkoutSnapshot<'a> {
    pub phase: Phase,
    pub previous: Option<Phase>,
    pub index: usize,
    pub total: usize,
    pub main_remaining: u32,
    pub rest_remaining: u32,
    pub current: Option<&'a SessionExercise>,
    pub next: Option<&'a SessionExercise>,
}

impl WorkoutSnapshot<'_> {
    /// Resting, or paused while resting
    pub fn shows_rest(&self) -> bool {
        self.phase == Phase::Resting
            || (self.phase == Phase::Paused && self.previous == Some(Phase::Resting))
    }
}

pub struct Workout<P: CuePlayer> {
    exercises: Vec<SessionExercise>,
    pause_duration: u32,
    timing: WorkoutTiming,
    phase: Phase,
    previous: Option<Phase>,
    index: usize,
    main: Countdown,
    rest: Countdown,
    end_rest_cued: bool,
    sounds_enabled: bool,
    player: P,
}

impl<P: CuePlayer> Workout<P> {
    /// Create a workout in the `Beginning` phase with the lead-in running
    pub fn new(
        exercises: Vec<SessionExercise>,
        pause_duration: u32,
        timing: WorkoutTiming,
        player: P,
    ) -> Self {
        let mut main = Countdown::new();
        main.start(timing.lead_in);

        Self {
            exercises,
            pause_duration,
            timing,
            phase: Phase::Beginning,
            previous: None,
            index: 0,
            main,
            rest: Countdown::new(),
            end_rest_cued: false,
            sounds_enabled: true,
            player,
        }
    }

    /// Silence cues without affecting timing
    pub fn set_sounds_enabled(&mut self, enabled: bool) {
        self.sounds_enabled = enabled;
    }

    /// Advance by one tick, returning the phase change it caused, if any
    pub fn tick(&mut self) -> Option<Transition> {
        match self.phase {
            Phase::Beginning => {
                self.main.tick();
                if self.main.is_finished() {
                    return self.start_first_exercise();
                }
                None
            }
            Phase::Exercising => {
                self.main.tick();
                if self.main.is_finished() {
                    return Some(self.finish_exercise());
                }
                None
            }
            Phase::Resting => {
                self.rest.tick();
                if self.rest.is_finished() {
                    return Some(self.start_next_exercise());
                }
                self.cue_end_rest_if_due();
                None
            }
            Phase::Paused | Phase::Ended => None,
        }
    }

    /// Freeze the running countdown. Returns `false` if there is nothing to pause.
    pub fn pause(&mut self) -> bool {
        match self.phase {
            Phase::Beginning | Phase::Exercising => self.main.pause(),
            Phase::Resting => self.rest.pause(),
            Phase::Paused | Phase::Ended => return false,
        }

        tracing::debug!("Workout paused during {}", self.phase);
        self.previous = Some(self.phase);
        self.phase = Phase::Paused;
        true
    }

    /// Resume the phase interrupted by [`Workout::pause`]
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        let Some(interrupted) = self.previous else {
            return false;
        };

        match interrupted {
            Phase::Beginning | Phase::Exercising => self.main.resume(),
            Phase::Resting => self.rest.resume(),
            Phase::Paused | Phase::Ended => return false,
        }

        tracing::debug!("Workout resumed into {}", interrupted);
        self.previous = Some(Phase::Paused);
        self.phase = interrupted;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.phase == Phase::Paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Give the user more preparation time before the first exercise
    pub fn add_lead_in_time(&mut self, seconds: u32) -> bool {
        let in_lead_in = self.phase == Phase::Beginning
            || (self.phase == Phase::Paused && self.previous == Some(Phase::Beginning));
        in_lead_in && self.main.extend(seconds, self.timing.lead_in_cap)
    }

    pub fn snapshot(&self) -> WorkoutSnapshot<'_> {
        WorkoutSnapshot {
            phase: self.phase,
            previous: self.previous,
            index: self.index,
            total: self.exercises.len(),
            main_remaining: self.main.remaining(),
            rest_remaining: self.rest.remaining(),
            current: self.exercises.get(self.index),
            next: self.exercises.get(self.index + 1),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    fn enter(&mut self, to: Phase) -> Transition {
        let from = self.phase;
        self.previous = Some(from);
        self.phase = to;
        tracing::debug!("Workout {} -> {} at exercise {}", from, to, self.index);
        Transition {
            from,
            to,
            index: self.index,
        }
    }

    fn start_first_exercise(&mut self) -> Option<Transition> {
        let Some(first) = self.exercises.first() else {
            tracing::debug!("Lead-in finished but the workout has no exercises");
            return None;
        };
        let duration = first.duration;

        self.index = 0;
        let transition = self.enter(Phase::Exercising);
        self.play(Cue::StartSession);
        self.main.start(duration);
        Some(transition)
    }

    fn finish_exercise(&mut self) -> Transition {
        if self.index + 1 < self.exercises.len() {
            let transition = self.enter(Phase::Resting);
            self.play(Cue::StartRest);
            self.end_rest_cued = false;
            self.rest.start(self.pause_duration);
            self.cue_end_rest_if_due();
            transition
        } else {
            let transition = self.enter(Phase::Ended);
            self.play(Cue::EndSession);
            self.main.stop();
            self.rest.stop();
            tracing::info!("Workout complete after {} exercises", self.exercises.len());
            transition
        }
    }

    fn start_next_exercise(&mut self) -> Transition {
        self.index = (self.index + 1).min(self.exercises.len().saturating_sub(1));
        let duration = self.exercises.get(self.index).map_or(0, |e| e.duration);

        let transition = self.enter(Phase::Exercising);
        self.main.start(duration);
        transition
    }

    fn cue_end_rest_if_due(&mut self) {
        let lead = self.timing.end_rest_cue_lead;
        if !self.end_rest_cued && lead > 0 && self.rest.is_running() && self.rest.remaining() == lead
        {
            self.end_rest_cued = true;
            self.play(Cue::EndRest);
        }
    }

    fn play(&mut self, cue: Cue) {
        if !self.sounds_enabled {
            return;
        }
        if let Err(e) = self.player.play(cue) {
            tracing::warn!("Failed to play {:?} cue: {}", cue, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, Error, Exercise};

    #[derive(Default)]
    struct Recorder {
        cues: Vec<Cue>,
    }

    impl CuePlayer for Recorder {
        fn play(&mut self, cue: Cue) -> Result<()> {
            self.cues.push(cue);
            Ok(())
        }
    }

    struct Broken;

    impl CuePlayer for Broken {
        fn play(&mut self, _cue: Cue) -> Result<()> {
            Err(Error::Other("no audio device".into()))
        }
    }

    fn exercises(durations: &[u32]) -> Vec<SessionExercise> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                SessionExercise::new(
                    Exercise {
                        id: format!("exercise-{}", i),
                        title: format!("Exercise {}", i),
                        image: "default".into(),
                        difficulties: vec![Difficulty::Easy],
                    },
                    *d,
                )
            })
            .collect()
    }

    /// Tick until ended (or the limit), returning every transition seen
    fn run<P: CuePlayer>(workout: &mut Workout<P>, limit: usize) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for _ in 0..limit {
            if let Some(t) = workout.tick() {
                transitions.push(t);
            }
            if workout.is_ended() {
                break;
            }
        }
        transitions
    }

    #[test]
    fn test_lead_in_fires_one_transition_after_five_ticks() {
        let mut workout = Workout::new(exercises(&[30]), 10, WorkoutTiming::default(), Recorder::default());

        for _ in 0..4 {
            assert_eq!(workout.tick(), None);
        }
        assert_eq!(workout.snapshot().main_remaining, 1);

        let transition = workout.tick().unwrap();
        assert_eq!(transition.from, Phase::Beginning);
        assert_eq!(transition.to, Phase::Exercising);
        assert_eq!(workout.snapshot().main_remaining, 30);
        assert_eq!(workout.player().cues, vec![Cue::StartSession]);

        // Next tick is an ordinary exercise tick
        assert_eq!(workout.tick(), None);
        assert_eq!(workout.snapshot().main_remaining, 29);
    }

    #[test]
    fn test_empty_workout_never_starts() {
        let timing = WorkoutTiming {
            lead_in: 0,
            ..WorkoutTiming::default()
        };
        let mut workout = Workout::new(vec![], 10, timing, Recorder::default());

        assert!(run(&mut workout, 20).is_empty());
        assert_eq!(workout.phase(), Phase::Beginning);
        assert!(workout.player().cues.is_empty());
    }

    #[test]
    fn test_full_run_visits_each_exercise_and_rest() {
        let mut workout = Workout::new(exercises(&[2, 2, 2]), 3, WorkoutTiming::default(), Recorder::default());

        let transitions = run(&mut workout, 100);

        let exercising = transitions.iter().filter(|t| t.to == Phase::Exercising).count();
        let resting = transitions.iter().filter(|t| t.to == Phase::Resting).count();
        assert_eq!(exercising, 3);
        assert_eq!(resting, 2);
        assert_eq!(transitions.last().unwrap().to, Phase::Ended);
        assert!(workout.is_ended());

        assert_eq!(
            workout.player().cues,
            vec![
                Cue::StartSession,
                Cue::StartRest,
                Cue::EndRest,
                Cue::StartRest,
                Cue::EndRest,
                Cue::EndSession,
            ]
        );
    }

    #[test]
    fn test_run_takes_expected_number_of_ticks() {
        let mut workout = Workout::new(exercises(&[2, 2, 2]), 3, WorkoutTiming::default(), SilentPlayer);

        let mut ticks = 0;
        while !workout.is_ended() && ticks < 100 {
            workout.tick();
            ticks += 1;
        }

        // lead-in + three exercises + two rests
        assert_eq!(ticks, 5 + 3 * 2 + 2 * 3);
    }

    #[test]
    fn test_index_advances_only_after_rest() {
        let mut workout = Workout::new(exercises(&[1, 1]), 2, WorkoutTiming::default(), SilentPlayer);
        run_until(&mut workout, Phase::Resting);

        let snapshot = workout.snapshot();
        assert_eq!(snapshot.index, 0);
        assert_eq!(snapshot.next.unwrap().id(), "exercise-1");
        assert!(snapshot.shows_rest());

        run_until(&mut workout, Phase::Exercising);
        assert_eq!(workout.snapshot().index, 1);
        assert!(workout.snapshot().next.is_none());
    }

    fn run_until<P: CuePlayer>(workout: &mut Workout<P>, phase: Phase) {
        for _ in 0..100 {
            if let Some(t) = workout.tick() {
                if t.to == phase {
                    return;
                }
            }
        }
        panic!("never reached {}", phase);
    }

    #[test]
    fn test_end_rest_cue_fires_two_ticks_before_rest_ends() {
        let mut workout = Workout::new(exercises(&[1, 1]), 5, WorkoutTiming::default(), Recorder::default());
        run_until(&mut workout, Phase::Resting);
        assert_eq!(workout.player().cues.last(), Some(&Cue::StartRest));

        // 5 -> 4 -> 3: no cue yet
        workout.tick();
        workout.tick();
        assert_eq!(workout.player().cues.last(), Some(&Cue::StartRest));

        // 3 -> 2: cue
        workout.tick();
        assert_eq!(workout.snapshot().rest_remaining, 2);
        assert_eq!(workout.player().cues.last(), Some(&Cue::EndRest));

        workout.tick();
        let cue_count = workout.player().cues.iter().filter(|c| **c == Cue::EndRest).count();
        assert_eq!(cue_count, 1);
    }

    #[test]
    fn test_pause_resume_during_exercise_keeps_countdown() {
        let mut workout = Workout::new(exercises(&[10]), 3, WorkoutTiming::default(), SilentPlayer);
        run_until(&mut workout, Phase::Exercising);
        workout.tick();
        workout.tick();
        assert_eq!(workout.snapshot().main_remaining, 8);

        assert!(workout.pause());
        assert_eq!(workout.phase(), Phase::Paused);
        for _ in 0..7 {
            assert_eq!(workout.tick(), None);
        }
        assert_eq!(workout.snapshot().main_remaining, 8);

        assert!(workout.resume());
        assert_eq!(workout.phase(), Phase::Exercising);
        assert_eq!(workout.snapshot().main_remaining, 8);

        workout.tick();
        assert_eq!(workout.snapshot().main_remaining, 7);
    }

    #[test]
    fn test_pause_during_rest_resumes_rest() {
        let mut workout = Workout::new(exercises(&[1, 1]), 6, WorkoutTiming::default(), SilentPlayer);
        run_until(&mut workout, Phase::Resting);
        workout.tick();

        assert!(workout.toggle_pause());
        let snapshot = workout.snapshot();
        assert_eq!(snapshot.phase, Phase::Paused);
        assert!(snapshot.shows_rest());
        workout.tick();
        assert_eq!(workout.snapshot().rest_remaining, 5);

        assert!(workout.toggle_pause());
        assert_eq!(workout.phase(), Phase::Resting);
        assert_eq!(workout.snapshot().rest_remaining, 5);
    }

    #[test]
    fn test_pause_and_resume_guards() {
        let mut workout = Workout::new(exercises(&[1]), 0, WorkoutTiming::default(), SilentPlayer);
        assert!(!workout.resume());

        run(&mut workout, 100);
        assert!(workout.is_ended());
        assert!(!workout.pause());
        assert!(!workout.resume());
    }

    #[test]
    fn test_lead_in_can_be_extended_up_to_cap() {
        let mut workout = Workout::new(exercises(&[5]), 0, WorkoutTiming::default(), SilentPlayer);

        assert!(workout.add_lead_in_time(10));
        assert_eq!(workout.snapshot().main_remaining, 15);

        assert!(workout.add_lead_in_time(100));
        assert_eq!(workout.snapshot().main_remaining, 60);

        // Paused during lead-in still accepts extra time (but capped)
        workout.tick();
        workout.pause();
        assert!(workout.add_lead_in_time(30));
        assert_eq!(workout.snapshot().main_remaining, 60);
        workout.resume();

        run_until(&mut workout, Phase::Exercising);
        assert!(!workout.add_lead_in_time(10));
        assert_eq!(workout.snapshot().main_remaining, 5);
    }

    #[test]
    fn test_broken_audio_does_not_block_progress() {
        crate::logging::init_test();

        let mut workout = Workout::new(exercises(&[1, 1]), 1, WorkoutTiming::default(), Broken);
        let transitions = run(&mut workout, 100);

        assert!(workout.is_ended());
        assert_eq!(transitions.len(), 4);
    }

    #[test]
    fn test_sounds_disabled_keeps_timing() {
        let mut workout = Workout::new(exercises(&[2, 2]), 2, WorkoutTiming::default(), Recorder::default());
        workout.set_sounds_enabled(false);

        let transitions = run(&mut workout, 100);

        assert!(workout.is_ended());
        assert_eq!(transitions.len(), 4);
        assert!(workout.player().cues.is_empty());
    }

    #[test]
    fn test_zero_rest_goes_straight_to_next_exercise() {
        let mut workout = Workout::new(exercises(&[1, 1]), 0, WorkoutTiming::default(), SilentPlayer);
        run_until(&mut workout, Phase::Resting);

        let transition = workout.tick().unwrap();
        assert_eq!(transition.to, Phase::Exercising);
        assert_eq!(transition.index, 1);
    }
}
