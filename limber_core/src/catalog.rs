//! Exercise pool: the built-in stretching catalog and pluggable sources.
//!
//! The pool is supplied to the selector by an [`ExerciseSource`]. The built-in
//! catalog is cached; a JSON file can replace it through the configuration.

use crate::sided::{self, Side, LEFT_SUFFIX, RIGHT_SUFFIX};
use crate::{Difficulty, Error, Exercise, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::PathBuf;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Vec<Exercise>> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static [Exercise] {
    &DEFAULT_CATALOG
}

/// Storage collaborator supplying the exercise pool
pub trait ExerciseSource {
    fn fetch_exercises(&self) -> Result<Vec<Exercise>>;
}

/// The built-in catalog
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCatalog;

impl ExerciseSource for BuiltinCatalog {
    fn fetch_exercises(&self) -> Result<Vec<Exercise>> {
        Ok(get_default_catalog().to_vec())
    }
}

/// A JSON array of exercises on disk
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ExerciseSource for JsonFileSource {
    fn fetch_exercises(&self) -> Result<Vec<Exercise>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let exercises: Vec<Exercise> = serde_json::from_str(&contents)?;

        let errors = validate(&exercises);
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }

        tracing::info!(
            "Loaded {} exercises from {:?}",
            exercises.len(),
            self.path
        );
        Ok(exercises)
    }
}

/// Check a pool for problems the selector cannot work around
///
/// Returns one message per problem; an empty list means the pool is usable.
pub fn validate(pool: &[Exercise]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for exercise in pool {
        if !seen.insert(exercise.id.as_str()) {
            errors.push(format!("Duplicate exercise id '{}'", exercise.id));
        }

        if exercise.difficulties.is_empty() {
            errors.push(format!("Exercise '{}' has no difficulty", exercise.id));
        }

        if sided::is_sided(&exercise.id) && sided::find_opposite(exercise, pool).is_none() {
            errors.push(format!(
                "Sided exercise '{}' has no opposite-side sibling",
                exercise.id
            ));
        }
    }

    errors
}

fn levels(levels: &[u8]) -> Vec<Difficulty> {
    levels
        .iter()
        .filter_map(|l| Difficulty::try_from(*l).ok())
        .collect()
}

fn plain(id: &str, title: &str, difficulties: &[u8]) -> Exercise {
    Exercise {
        id: id.into(),
        title: title.into(),
        image: id.into(),
        difficulties: levels(difficulties),
    }
}

fn sided_pair(base: &str, title: &str, difficulties: &[u8]) -> [Exercise; 2] {
    [Side::Left, Side::Right].map(|side| {
        let (suffix, label) = match side {
            Side::Left => (LEFT_SUFFIX, "left"),
            Side::Right => (RIGHT_SUFFIX, "right"),
        };
        let id = format!("{}{}", base, suffix);
        Exercise {
            image: id.clone(),
            id,
            title: format!("{} ({})", title, label),
            difficulties: levels(difficulties),
        }
    })
}

/// Builds the default catalog of stretching exercises
pub fn build_default_catalog() -> Vec<Exercise> {
    let mut exercises = vec![
        plain("crossed-leg-forward-fold", "Crossed-leg forward fold", &[1, 2]),
        plain("butterfly-stretch", "Butterfly stretch", &[1]),
        plain("yogi-squat", "Yogi squat", &[2, 3]),
        plain("extended-puppy-pose", "Extended puppy pose", &[1, 2]),
        plain("camel-stretch", "Camel stretch", &[2, 3]),
        plain("child-s-pose", "Child's pose", &[1]),
        plain("seated-forward-fold", "Seated forward fold", &[1, 2]),
        plain("cobra", "Cobra", &[1, 2]),
        plain("downward-dog", "Downward dog", &[2, 3]),
        plain("forward-fold-hamstring-stretch", "Forward fold hamstring stretch", &[1, 2]),
        plain("double-legged-quad-stretch", "Double-legged quad stretch", &[3]),
        plain("frog-stretch", "Frog stretch", &[2, 3]),
        plain("baby-pose", "Happy baby pose", &[1]),
        plain("hanging-hamstring-stretch", "Hanging hamstring stretch", &[1, 2]),
    ];

    let pairs = [
        sided_pair("hamstring-stretch", "Hamstring stretch", &[1, 2]),
        sided_pair("lunge-upper-body-opener", "Lunge with upper body opener", &[2, 3]),
        sided_pair("gate-pose-bend", "Gate pose bend", &[1, 2]),
        sided_pair("pigeon-pose", "Pigeon pose", &[2, 3]),
        sided_pair("seated-quad-stretch", "Seated quad stretch", &[1, 2]),
        sided_pair("wide-leg-side-stretch", "Wide-leg side stretch", &[1, 2]),
        sided_pair("side-baby-pose", "Side happy baby pose", &[1]),
        sided_pair("thread-the-needle", "Thread the needle", &[1, 2]),
        sided_pair("runners-stretch", "Runner's stretch", &[2]),
        sided_pair("kneeling-hamstring-stretch", "Kneeling hamstring stretch", &[2, 3]),
        sided_pair("adductor-stretch", "Adductor stretch", &[2, 3]),
        sided_pair("tricep-stretch", "Tricep stretch", &[1]),
        sided_pair("shoulder-stretch", "Shoulder stretch", &[1]),
        sided_pair("side-neck-stretch", "Side neck stretch", &[1]),
    ];
    exercises.extend(pairs.into_iter().flatten());

    exercises
}
