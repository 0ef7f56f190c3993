//! Automatic session titles.

use crate::Language;
use chrono::Timelike;

/// Minutes at or below which a session counts as short
const SHORT_SESSION_MINUTES: u32 = 12;

/// Minutes at or above which a session counts as long
const LONG_SESSION_MINUTES: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Length {
    Short,
    Regular,
    Long,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimeOfDay {
    WakeUp,
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

fn length_of(total_duration: u32) -> Length {
    if total_duration <= SHORT_SESSION_MINUTES * 60 {
        Length::Short
    } else if total_duration >= LONG_SESSION_MINUTES * 60 {
        Length::Long
    } else {
        Length::Regular
    }
}

fn time_of_day(hour: u32) -> TimeOfDay {
    match hour {
        5..=8 => TimeOfDay::WakeUp,
        9..=11 => TimeOfDay::Morning,
        12..=13 => TimeOfDay::Midday,
        14..=17 => TimeOfDay::Afternoon,
        18..=21 => TimeOfDay::Evening,
        _ => TimeOfDay::Night,
    }
}

/// Title such as "Short morning session" from the planned duration (seconds)
/// and the time the session starts
pub fn generate_session_title<T: Timelike>(total_duration: u32, at: &T, language: Language) -> String {
    let length = length_of(total_duration);
    let time = time_of_day(at.hour());

    match language {
        Language::En => {
            let time = match time {
                TimeOfDay::WakeUp => "wake-up",
                TimeOfDay::Morning => "morning",
                TimeOfDay::Midday => "midday",
                TimeOfDay::Afternoon => "afternoon",
                TimeOfDay::Evening => "evening",
                TimeOfDay::Night => "night",
            };
            let title = match length {
                Length::Short => format!("short {} session", time),
                Length::Regular => format!("{} session", time),
                Length::Long => format!("long {} session", time),
            };
            capitalize(&title)
        }
        Language::Fr => {
            let time = match time {
                TimeOfDay::WakeUp => "du réveil",
                TimeOfDay::Morning => "du matin",
                TimeOfDay::Midday => "du midi",
                TimeOfDay::Afternoon => "de l'après-midi",
                TimeOfDay::Evening => "du soir",
                TimeOfDay::Night => "de nuit",
            };
            match length {
                Length::Short => format!("Courte séance {}", time),
                Length::Regular => format!("Séance {}", time),
                Length::Long => format!("Longue séance {}", time),
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
