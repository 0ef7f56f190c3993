//! Session persistence as an append-only journal.
//!
//! Every mutation of a session record is appended as one JSON line (JSONL)
//! under an exclusive file lock. Reading replays the journal into the current
//! state of each session, skipping lines that fail to parse.

use crate::title::generate_session_title;
use crate::{Error, Language, Result, Session, SessionConfig, SessionExercise};
use chrono::{DateTime, Local, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Data needed to record a session the user just started
#[derive(Clone, Debug)]
pub struct CreateSessionInput {
    pub user_id: String,
    pub config: SessionConfig,
    pub exercises: Vec<SessionExercise>,
    /// Generated from duration and time of day when `None`
    pub title: Option<String>,
}

/// Storage collaborator for session records
pub trait SessionRepository {
    /// Record a new session in the started state
    fn create_session(&mut self, input: CreateSessionInput) -> Result<Session>;

    /// Mark a session completed, optionally renaming it
    fn complete_session(&mut self, id: Uuid, title: Option<String>) -> Result<Session>;

    fn set_favorite(&mut self, id: Uuid, favorite: bool) -> Result<Session>;

    fn rename_session(&mut self, id: Uuid, title: String) -> Result<Session>;

    fn get_session(&self, id: Uuid) -> Result<Option<Session>>;

    /// Sessions of `user_id`, most recently started first
    fn user_sessions(
        &self,
        user_id: &str,
        include_incomplete: bool,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Session>>;
}

/// One line of the journal
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SessionEvent {
    Created {
        session: Session,
    },
    Completed {
        id: Uuid,
        at: DateTime<Utc>,
        title: Option<String>,
    },
    Favorited {
        id: Uuid,
        at: DateTime<Utc>,
        favorite: bool,
    },
    Renamed {
        id: Uuid,
        at: DateTime<Utc>,
        title: String,
    },
}

impl SessionEvent {
    fn session_id(&self) -> Uuid {
        match self {
            SessionEvent::Created { session } => session.id,
            SessionEvent::Completed { id, .. }
            | SessionEvent::Favorited { id, .. }
            | SessionEvent::Renamed { id, .. } => *id,
        }
    }

    /// Apply a mutation event to the session it targets
    fn apply(self, session: &mut Session) {
        match self {
            SessionEvent::Created { session: created } => *session = created,
            SessionEvent::Completed { at, title, .. } => {
                // First completion wins; later ones may still rename
                if session.completed_at.is_none() {
                    session.completed_at = Some(at);
                }
                if let Some(title) = title {
                    session.title = title;
                }
                session.updated_at = at;
            }
            SessionEvent::Favorited { at, favorite, .. } => {
                session.favorite = favorite;
                session.updated_at = at;
            }
            SessionEvent::Renamed { at, title, .. } => {
                session.title = title;
                session.updated_at = at;
            }
        }
    }
}

/// JSONL-backed session repository with file locking
pub struct SessionJournal {
    path: PathBuf,
    language: Language,
}

impl SessionJournal {
    /// Create a journal for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            language: Language::default(),
        }
    }

    /// Language for generated session titles
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every session in the journal, in creation order
    pub fn load_all(&self) -> Result<Vec<Session>> {
        let events = read_events(&self.path)?;
        Ok(replay(events))
    }

    fn append(&self, event: &SessionEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.sync_all()?;
        file.unlock()?;

        tracing::debug!("Appended event for session {} to journal", event.session_id());
        Ok(())
    }

    /// Append a mutation for an existing session and return its new state
    fn mutate(&mut self, event: SessionEvent) -> Result<Session> {
        let id = event.session_id();
        let mut session = self
            .get_session(id)?
            .ok_or(Error::SessionNotFound(id))?;

        self.append(&event)?;
        event.apply(&mut session);
        Ok(session)
    }
}

impl SessionRepository for SessionJournal {
    fn create_session(&mut self, input: CreateSessionInput) -> Result<Session> {
        let now = Utc::now();
        let count = input.exercises.len();
        let total_duration = input.config.total_duration_for(count);

        let title = input.title.unwrap_or_else(|| {
            generate_session_title(total_duration, &now.with_timezone(&Local), self.language)
        });

        let session = Session {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            title,
            difficulty: input.config.difficulty,
            number_of_exercises: count as u32,
            exercise_duration: input.config.exercise_duration,
            pause_duration: input.config.pause_duration,
            total_duration,
            favorite: false,
            exercises: input.exercises,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.append(&SessionEvent::Created {
            session: session.clone(),
        })?;

        tracing::info!("Created session {} ({})", session.id, session.title);
        Ok(session)
    }

    fn complete_session(&mut self, id: Uuid, title: Option<String>) -> Result<Session> {
        let session = self.mutate(SessionEvent::Completed {
            id,
            at: Utc::now(),
            title,
        })?;
        tracing::info!("Completed session {}", id);
        Ok(session)
    }

    fn set_favorite(&mut self, id: Uuid, favorite: bool) -> Result<Session> {
        self.mutate(SessionEvent::Favorited {
            id,
            at: Utc::now(),
            favorite,
        })
    }

    fn rename_session(&mut self, id: Uuid, title: String) -> Result<Session> {
        self.mutate(SessionEvent::Renamed {
            id,
            at: Utc::now(),
            title,
        })
    }

    fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.load_all()?.into_iter().find(|s| s.id == id))
    }

    fn user_sessions(
        &self,
        user_id: &str,
        include_incomplete: bool,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .load_all()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| include_incomplete || s.is_completed())
            .collect();

        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(sessions
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }
}

fn read_events(path: &Path) -> Result<Vec<SessionEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} events from journal", events.len());
    Ok(events)
}

fn replay(events: Vec<SessionEvent>) -> Vec<Session> {
    let mut sessions: Vec<Session> = Vec::new();
    let mut positions: HashMap<Uuid, usize> = HashMap::new();

    for event in events {
        let id = event.session_id();
        match event {
            SessionEvent::Created { session } => {
                if positions.contains_key(&id) {
                    tracing::warn!("Ignoring duplicate creation of session {}", id);
                    continue;
                }
                positions.insert(id, sessions.len());
                sessions.push(session);
            }
            mutation => match positions.get(&id) {
                Some(&position) => mutation.apply(&mut sessions[position]),
                None => tracing::warn!("Ignoring event for unknown session {}", id),
            },
        }
    }

    sessions
}
