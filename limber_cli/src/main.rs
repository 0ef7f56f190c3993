use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use limber_core::stats::{CalendarDay, SessionStats};
use limber_core::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "limber")]
#[command(about = "Guided stretching sessions in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Copy, Debug, Default)]
struct SessionArgs {
    /// Target stretching time in seconds
    #[arg(long)]
    effort: Option<u32>,

    /// Rest between exercises in seconds
    #[arg(long)]
    pause: Option<u32>,

    /// Duration of each exercise in seconds
    #[arg(long)]
    exercise: Option<u32>,

    /// Difficulty level (1 = easy, 2 = medium, 3 = hard)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the exercises that would make up a session
    Plan {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Plan a session and run it
    Start {
        #[command(flatten)]
        session: SessionArgs,

        /// Session title (generated when omitted)
        #[arg(long)]
        title: Option<String>,

        /// Milliseconds per tick, overriding the configuration
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Extra seconds of preparation before the first exercise
        #[arg(long, default_value_t = 0)]
        extra_lead_in: u32,

        /// Do not play cues for this run
        #[arg(long)]
        no_sound: bool,
    },

    /// List recorded sessions, newest first
    History {
        /// Include sessions that were never completed
        #[arg(long)]
        all: bool,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        offset: Option<usize>,
    },

    /// Totals, streaks and the activity calendar
    Stats,

    /// Mark a session completed
    Complete {
        id: Uuid,

        /// Rename the session at the same time
        #[arg(long)]
        title: Option<String>,
    },

    /// Mark a session as favorite
    Favorite {
        id: Uuid,

        /// Remove the favorite mark instead
        #[arg(long)]
        off: bool,
    },

    /// Change the title of a session
    Rename { id: Uuid, title: String },

    /// Turn cues on or off
    Sounds {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Set the language of generated titles
    Language { language: Language },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn parse_difficulty(value: &str) -> std::result::Result<Difficulty, String> {
    let level: u8 = value
        .parse()
        .map_err(|_| format!("not a difficulty level: {}", value))?;
    Difficulty::try_from(level)
}

fn main() -> Result<()> {
    limber_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;

    let paths = DataPaths::new(&data_dir);

    match cli.command {
        Commands::Plan { session } => cmd_plan(&config, session),
        Commands::Start {
            session,
            title,
            tick_ms,
            extra_lead_in,
            no_sound,
        } => cmd_start(
            &config,
            &paths,
            session,
            StartOptions {
                title,
                tick_ms,
                extra_lead_in,
                no_sound,
            },
        ),
        Commands::History { all, limit, offset } => cmd_history(&config, &paths, all, limit, offset),
        Commands::Stats => cmd_stats(&config, &paths),
        Commands::Complete { id, title } => {
            let session = paths.journal()?.complete_session(id, title)?;
            println!("✓ Completed \"{}\"", session.title);
            Ok(())
        }
        Commands::Favorite { id, off } => {
            let session = paths.journal()?.set_favorite(id, !off)?;
            if session.favorite {
                println!("★ \"{}\" added to favorites", session.title);
            } else {
                println!("\"{}\" removed from favorites", session.title);
            }
            Ok(())
        }
        Commands::Rename { id, title } => {
            let session = paths.journal()?.rename_session(id, title)?;
            println!("✓ Renamed to \"{}\"", session.title);
            Ok(())
        }
        Commands::Sounds { state } => {
            let enabled = matches!(state, Toggle::On);
            Preferences::update(&paths.preferences, |p| p.sounds_enabled = enabled)?;
            println!("Sounds {}", if enabled { "on" } else { "off" });
            Ok(())
        }
        Commands::Language { language } => {
            Preferences::update(&paths.preferences, |p| p.language = language)?;
            println!("Language set to {}", language);
            Ok(())
        }
    }
}

struct DataPaths {
    sessions: PathBuf,
    preferences: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        Self {
            sessions: data_dir.join("sessions.jsonl"),
            preferences: data_dir.join("preferences.json"),
        }
    }

    fn journal(&self) -> Result<SessionJournal> {
        let preferences = Preferences::load(&self.preferences)?;
        Ok(SessionJournal::new(&self.sessions).with_language(preferences.language))
    }
}

struct StartOptions {
    title: Option<String>,
    tick_ms: Option<u64>,
    extra_lead_in: u32,
    no_sound: bool,
}

fn session_config(config: &Config, args: SessionArgs) -> SessionConfig {
    let defaults = config.session.to_session_config();
    SessionConfig {
        effort_duration: args.effort.unwrap_or(defaults.effort_duration),
        pause_duration: args.pause.unwrap_or(defaults.pause_duration),
        exercise_duration: args.exercise.unwrap_or(defaults.exercise_duration),
        difficulty: args.difficulty.unwrap_or(defaults.difficulty),
    }
}

fn exercise_source(config: &Config) -> Box<dyn ExerciseSource> {
    match &config.catalog.exercises_file {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(BuiltinCatalog),
    }
}

fn plan_session(config: &Config, args: SessionArgs) -> Result<SessionPlanner> {
    let session_config = session_config(config, args);
    if session_config.exercise_duration == 0 {
        return Err(Error::Config("exercise duration must be greater than zero".into()));
    }

    let source = exercise_source(config);
    let mut planner = SessionPlanner::new();
    planner.initialize(session_config, source.as_ref())?;
    Ok(planner)
}

fn cmd_plan(config: &Config, args: SessionArgs) -> Result<()> {
    let planner = plan_session(config, args)?;
    let Some(session_config) = planner.config().copied() else {
        return Ok(());
    };

    display_plan(&session_config, planner.exercises());
    Ok(())
}

fn cmd_start(config: &Config, paths: &DataPaths, args: SessionArgs, options: StartOptions) -> Result<()> {
    let mut planner = plan_session(config, args)?;
    let Some(session_config) = planner.config().copied() else {
        return Ok(());
    };

    if planner.exercises().is_empty() {
        println!("No exercises fit this configuration - nothing to start.");
        return Ok(());
    }

    display_plan(&session_config, planner.exercises());

    let preferences = Preferences::load(&paths.preferences)?;
    let mut journal = SessionJournal::new(&paths.sessions).with_language(preferences.language);
    let session = journal.create_session(CreateSessionInput {
        user_id: config.data.user_id.clone(),
        config: session_config,
        exercises: planner.exercises().to_vec(),
        title: options.title,
    })?;
    planner.set_session_id(session.id);

    println!("\n▶ {} ({})", session.title, session.id);

    let mut workout = planner.build_workout(config.workout.timing(), TerminalPlayer);
    workout.set_sounds_enabled(preferences.sounds_enabled && !options.no_sound);
    if options.extra_lead_in > 0 && workout.add_lead_in_time(options.extra_lead_in) {
        println!("  Lead-in: {}s", workout.snapshot().main_remaining);
    }

    let tick = Duration::from_millis(options.tick_ms.unwrap_or(config.workout.tick_millis));
    while !workout.is_ended() {
        if !tick.is_zero() {
            std::thread::sleep(tick);
        }
        if let Some(transition) = workout.tick() {
            display_transition(&transition, &workout.snapshot(), session_config.pause_duration);
        }
    }

    let session = journal.complete_session(session.id, None)?;
    println!("\n✓ Session \"{}\" completed!", session.title);
    Ok(())
}

fn cmd_history(
    config: &Config,
    paths: &DataPaths,
    all: bool,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<()> {
    let sessions = paths
        .journal()?
        .user_sessions(&config.data.user_id, all, limit, offset)?;

    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    for session in sessions {
        let started = session.started_at.with_timezone(&Local);
        println!(
            "{} {} {}  {}  {} exercises, {}  {}",
            if session.is_completed() { "✓" } else { "…" },
            if session.favorite { "★" } else { " " },
            started.format("%Y-%m-%d %H:%M"),
            session.title,
            session.number_of_exercises,
            format_duration(session.total_duration),
            session.id,
        );
    }

    Ok(())
}

fn cmd_stats(config: &Config, paths: &DataPaths) -> Result<()> {
    let sessions = paths
        .journal()?
        .user_sessions(&config.data.user_id, false, None, None)?;

    let SessionStats {
        total_sessions,
        total_exercises,
        total_effort_duration,
    } = user_session_stats(&sessions);

    println!("Sessions:  {}", total_sessions);
    println!("Exercises: {}", total_exercises);
    println!("Time:      {}", format_duration(total_effort_duration));

    let today = Local::now().date_naive();
    let calendar = activity_calendar(today, &daily_activity(&sessions, &Local));
    let streaks = streaks(&calendar);

    println!();
    println!("Current streak: {} day(s)", streaks.current);
    println!("Longest streak: {} day(s)", streaks.longest);
    println!();
    display_calendar(&calendar);

    Ok(())
}

/// Prints cues as terminal bells with a label
struct TerminalPlayer;

impl CuePlayer for TerminalPlayer {
    fn play(&mut self, cue: Cue) -> Result<()> {
        let label = match cue {
            Cue::StartSession => "go",
            Cue::EndSession => "done",
            Cue::StartRest => "rest",
            Cue::EndRest => "get ready",
        };
        println!("  ♪ {}", label);
        Ok(())
    }
}

fn display_plan(config: &SessionConfig, exercises: &[SessionExercise]) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  STRETCHING SESSION ({})", config.difficulty);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} exercises × {}s, {}s rest  (total {})",
        exercises.len(),
        config.exercise_duration,
        config.pause_duration,
        format_duration(config.total_duration_for(exercises.len())),
    );
    println!();

    for (index, exercise) in exercises.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, exercise.exercise.title);
    }
}

fn display_transition(transition: &Transition, snapshot: &WorkoutSnapshot<'_>, pause: u32) {
    match transition.to {
        Phase::Exercising => {
            if let Some(current) = snapshot.current {
                println!(
                    "[{}/{}] {} ({}s)",
                    transition.index + 1,
                    snapshot.total,
                    current.exercise.title,
                    current.duration
                );
            }
        }
        Phase::Resting => {
            let next = snapshot
                .next
                .map_or("-", |e| e.exercise.title.as_str());
            println!("  Rest {}s, next: {}", pause, next);
        }
        Phase::Ended => println!("  All exercises done"),
        Phase::Beginning | Phase::Paused => {}
    }
}

fn display_calendar(calendar: &[CalendarDay]) {
    println!("  Mo Tu We Th Fr Sa Su");
    for week in calendar.chunks(7) {
        let row: Vec<&str> = week
            .iter()
            .map(|day| {
                if day.is_future {
                    "  "
                } else {
                    match day.intensity() {
                        0 => " ·",
                        1 => " ░",
                        2 => " ▒",
                        3 => " ▓",
                        _ => " █",
                    }
                }
            })
            .collect();
        println!(" {}", row.join(" "));
    }
}

fn format_duration(seconds: u32) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;
    if rest == 0 {
        format!("{}m", minutes)
    } else {
        format!("{}m{:02}s", minutes, rest)
    }
}
