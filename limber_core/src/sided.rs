//! Helpers for sided exercises.
//!
//! A sided exercise targets one side of the body and is identified by an id
//! ending in `-left-side` or `-right-side`. Its sibling shares the same base id
//! with the opposite suffix.

use crate::Exercise;

pub const LEFT_SUFFIX: &str = "-left-side";
pub const RIGHT_SUFFIX: &str = "-right-side";

/// Which side of the body a sided exercise targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The side encoded in an exercise id, if any
pub fn side_of(exercise_id: &str) -> Option<Side> {
    if exercise_id.ends_with(LEFT_SUFFIX) {
        Some(Side::Left)
    } else if exercise_id.ends_with(RIGHT_SUFFIX) {
        Some(Side::Right)
    } else {
        None
    }
}

pub fn is_sided(exercise_id: &str) -> bool {
    side_of(exercise_id).is_some()
}

/// Id of the opposite-side sibling, or `None` for unsided exercises
pub fn opposite_side_id(exercise_id: &str) -> Option<String> {
    if let Some(base) = exercise_id.strip_suffix(LEFT_SUFFIX) {
        return Some(format!("{}{}", base, RIGHT_SUFFIX));
    }
    exercise_id
        .strip_suffix(RIGHT_SUFFIX)
        .map(|base| format!("{}{}", base, LEFT_SUFFIX))
}

/// Look up the opposite-side sibling of `exercise` in `pool`
pub fn find_opposite<'a>(exercise: &Exercise, pool: &'a [Exercise]) -> Option<&'a Exercise> {
    let opposite_id = opposite_side_id(&exercise.id)?;
    pool.iter().find(|e| e.id == opposite_id)
}

/// Whether `left` and `right` form a correctly ordered pair
pub fn is_ordered_pair(left: &str, right: &str) -> bool {
    side_of(left) == Some(Side::Left) && opposite_side_id(left).as_deref() == Some(right)
}
