//! Exercise selection for a session.
//!
//! Selection keeps the exercises already picked where it can, prefers the
//! requested difficulty, and never splits a sided pair: a sided exercise is
//! always immediately followed (left) or preceded (right) by its sibling.

use crate::sided::{self, Side};
use crate::{Difficulty, Exercise, SessionExercise};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashSet;
use std::ops::Range;

/// Adjust `current` so it holds `target_count` exercises
///
/// - Same length: `current` is returned unchanged.
/// - Too long: truncated, dropping a trailing sided exercise left without its
///   sibling (the result may then be one shorter than requested).
/// - Too short: unused pool exercises are shuffled, those eligible for
///   `difficulty` are scanned first, and each appended entry gets `duration`.
///   The result is shorter than requested when the pool runs out.
pub fn select_exercises(
    pool: &[Exercise],
    current: &[SessionExercise],
    difficulty: Difficulty,
    target_count: usize,
    duration: u32,
) -> Vec<SessionExercise> {
    select_exercises_with(
        pool,
        current,
        difficulty,
        target_count,
        duration,
        &mut rand::rng(),
    )
}

/// [`select_exercises`] with an explicit random source
pub fn select_exercises_with<R: Rng + ?Sized>(
    pool: &[Exercise],
    current: &[SessionExercise],
    difficulty: Difficulty,
    target_count: usize,
    duration: u32,
    rng: &mut R,
) -> Vec<SessionExercise> {
    if current.len() == target_count {
        return current.to_vec();
    }

    if current.len() > target_count {
        return truncate_preserving_pairs(current, target_count);
    }

    let mut used: HashSet<&str> = current.iter().map(SessionExercise::id).collect();

    let mut candidates: Vec<&Exercise> = pool
        .iter()
        .filter(|e| !used.contains(e.id.as_str()))
        .collect();
    candidates.shuffle(rng);

    let (priority, fallback): (Vec<&Exercise>, Vec<&Exercise>) = candidates
        .into_iter()
        .partition(|e| e.supports(difficulty));

    tracing::debug!(
        "Selecting {} more exercises ({} matching {}, {} fallback)",
        target_count - current.len(),
        priority.len(),
        difficulty,
        fallback.len()
    );

    let mut selected = current.to_vec();

    for candidate in priority.into_iter().chain(fallback) {
        let room = target_count - selected.len();
        if room == 0 {
            break;
        }
        if used.contains(candidate.id.as_str()) {
            continue;
        }

        let Some(side) = sided::side_of(&candidate.id) else {
            used.insert(&candidate.id);
            selected.push(SessionExercise::new(candidate.clone(), duration));
            continue;
        };

        let Some(sibling) = sided::find_opposite(candidate, pool) else {
            tracing::debug!("Skipping '{}': no opposite side in pool", candidate.id);
            continue;
        };
        if room < 2 || used.contains(sibling.id.as_str()) {
            continue;
        }

        let (left, right) = match side {
            Side::Left => (candidate, sibling),
            Side::Right => (sibling, candidate),
        };
        used.insert(&left.id);
        used.insert(&right.id);
        selected.push(SessionExercise::new(left.clone(), duration));
        selected.push(SessionExercise::new(right.clone(), duration));
    }

    if selected.len() < target_count {
        tracing::debug!(
            "Pool exhausted: selected {} of {} exercises",
            selected.len(),
            target_count
        );
    }

    selected
}

fn truncate_preserving_pairs(current: &[SessionExercise], target_count: usize) -> Vec<SessionExercise> {
    let mut kept = current[..target_count].to_vec();

    let orphan = kept.last().is_some_and(|last| match sided::side_of(last.id()) {
        None => false,
        Some(Side::Left) => true,
        Some(Side::Right) => {
            let len = kept.len();
            len < 2 || !sided::is_ordered_pair(kept[len - 2].id(), last.id())
        }
    });

    if orphan {
        kept.pop();
    }
    kept
}

/// Slots `(left, right)` of the ordered sided pair that `index` belongs to
fn pair_slots(exercises: &[SessionExercise], index: usize) -> Option<(usize, usize)> {
    let entry = exercises.get(index)?;
    let (left, right) = match sided::side_of(entry.id())? {
        Side::Left => (index, index + 1),
        Side::Right => (index.checked_sub(1)?, index),
    };
    let is_pair = sided::is_ordered_pair(exercises.get(left)?.id(), exercises.get(right)?.id());
    is_pair.then_some((left, right))
}

/// The movable unit containing `index`: a sided pair, or a single entry
fn block_at(exercises: &[SessionExercise], index: usize) -> Option<Range<usize>> {
    if index >= exercises.len() {
        return None;
    }
    match pair_slots(exercises, index) {
        Some((left, right)) => Some(left..right + 1),
        None => Some(index..index + 1),
    }
}

/// Replace the exercise at `index` with a random unused one from the pool
///
/// The slot keeps its assigned duration. A slot holding half of a sided pair
/// gets a fresh pair in both slots. Returns `false` (no change) when the index
/// is out of range or no replacement is available.
pub fn replace_exercise(
    exercises: &mut [SessionExercise],
    pool: &[Exercise],
    index: usize,
) -> bool {
    replace_exercise_with(exercises, pool, index, &mut rand::rng())
}

/// [`replace_exercise`] with an explicit random source
pub fn replace_exercise_with<R: Rng + ?Sized>(
    exercises: &mut [SessionExercise],
    pool: &[Exercise],
    index: usize,
    rng: &mut R,
) -> bool {
    if index >= exercises.len() {
        return false;
    }

    let used: HashSet<String> = exercises.iter().map(|e| e.id().to_string()).collect();
    let is_free = |e: &Exercise| !used.contains(e.id.as_str());

    match pair_slots(exercises, index) {
        Some((left, right)) => {
            let pairs: Vec<(&Exercise, &Exercise)> = pool
                .iter()
                .filter(|e| sided::side_of(&e.id) == Some(Side::Left) && is_free(*e))
                .filter_map(|e| {
                    sided::find_opposite(e, pool)
                        .filter(|sibling| is_free(*sibling))
                        .map(|sibling| (e, sibling))
                })
                .collect();

            let Some((new_left, new_right)) = pairs.choose(rng) else {
                tracing::debug!("No unused sided pair to replace slot {}", index);
                return false;
            };

            exercises[left] = SessionExercise::new((*new_left).clone(), exercises[left].duration);
            exercises[right] = SessionExercise::new((*new_right).clone(), exercises[right].duration);
        }
        None => {
            let singles: Vec<&Exercise> = pool
                .iter()
                .filter(|e| !sided::is_sided(&e.id) && is_free(*e))
                .collect();

            let Some(choice) = singles.choose(rng) else {
                tracing::debug!("No unused exercise to replace slot {}", index);
                return false;
            };

            exercises[index] = SessionExercise::new((*choice).clone(), exercises[index].duration);
        }
    }

    true
}

/// Move the entry at `index` one position earlier
///
/// Sided pairs move as a unit. No-op (returns `false`) for the first entry or
/// an out-of-range index.
pub fn move_exercise_up(exercises: &mut [SessionExercise], index: usize) -> bool {
    let Some(block) = block_at(exercises, index) else {
        return false;
    };
    if block.start == 0 {
        return false;
    }
    let Some(previous) = block_at(exercises, block.start - 1) else {
        return false;
    };

    exercises[previous.start..block.end].rotate_left(previous.len());
    true
}

/// Move the entry at `index` one position later
///
/// Sided pairs move as a unit. No-op (returns `false`) for the last entry or
/// an out-of-range index.
pub fn move_exercise_down(exercises: &mut [SessionExercise], index: usize) -> bool {
    let Some(block) = block_at(exercises, index) else {
        return false;
    };
    let Some(next) = block_at(exercises, block.end) else {
        return false;
    };

    exercises[block.start..next.end].rotate_left(block.len());
    true
}
