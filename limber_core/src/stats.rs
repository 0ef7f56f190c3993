//! Session statistics, daily activity and streaks.

use crate::Session;
use chrono::{Datelike, Duration, NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Weeks shown in the activity calendar
pub const CALENDAR_WEEKS: i64 = 7;

/// Upper bounds (seconds) of the calendar intensity levels 1 to 3
const INTENSITY_THRESHOLDS: [u32; 3] = [10 * 60, 15 * 60, 20 * 60];

/// Totals over a user's completed sessions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub total_exercises: u32,
    /// Seconds spent stretching, rests excluded
    pub total_effort_duration: u32,
}

pub fn user_session_stats(sessions: &[Session]) -> SessionStats {
    sessions
        .iter()
        .filter(|s| s.is_completed())
        .fold(SessionStats::default(), |mut stats, session| {
            stats.total_sessions += 1;
            stats.total_exercises += session.number_of_exercises;
            stats.total_effort_duration += session.effort_duration();
            stats
        })
}

/// Completed sessions on one calendar day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub sessions_count: u32,
    /// Planned seconds including rests
    pub total_duration: u32,
}

/// Group completed sessions by the day (in `tz`) they were completed
pub fn daily_activity<Tz: TimeZone>(sessions: &[Session], tz: &Tz) -> BTreeMap<NaiveDate, DayActivity> {
    let mut activity: BTreeMap<NaiveDate, DayActivity> = BTreeMap::new();

    for session in sessions {
        let Some(completed_at) = session.completed_at else {
            continue;
        };
        let date = completed_at.with_timezone(tz).date_naive();

        let day = activity.entry(date).or_insert(DayActivity {
            date,
            sessions_count: 0,
            total_duration: 0,
        });
        day.sessions_count += 1;
        day.total_duration += session.total_duration;
    }

    activity
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub activity: Option<DayActivity>,
    pub is_future: bool,
}

impl CalendarDay {
    /// 0 for no activity, then 1 to 4 by total duration
    pub fn intensity(&self) -> u8 {
        let total = self.activity.as_ref().map_or(0, |a| a.total_duration);
        if total == 0 {
            return 0;
        }
        INTENSITY_THRESHOLDS
            .iter()
            .position(|limit| total < *limit)
            .map_or(4, |level| level as u8 + 1)
    }
}

/// Seven full weeks ending with the week of `today`, starting on a Monday
pub fn activity_calendar(today: NaiveDate, activity: &BTreeMap<NaiveDate, DayActivity>) -> Vec<CalendarDay> {
    let days_since_monday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(days_since_monday + (CALENDAR_WEEKS - 1) * 7);

    (0..CALENDAR_WEEKS * 7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            CalendarDay {
                date,
                activity: activity.get(&date).cloned(),
                is_future: date > today,
            }
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Streaks {
    /// Consecutive active days ending today (0 if today is inactive)
    pub current: u32,
    pub longest: u32,
    /// Most recent day of the current streak
    pub last_day: Option<NaiveDate>,
}

/// Current and longest runs of active days in a calendar, future days ignored
pub fn streaks(calendar: &[CalendarDay]) -> Streaks {
    let past: Vec<&CalendarDay> = calendar.iter().filter(|d| !d.is_future).collect();

    let current_days: Vec<&CalendarDay> = past
        .iter()
        .rev()
        .take_while(|d| d.activity.is_some())
        .copied()
        .collect();

    let mut longest = 0;
    let mut run = 0;
    for day in &past {
        if day.activity.is_some() {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    Streaks {
        current: current_days.len() as u32,
        longest,
        last_day: current_days.first().map(|d| d.date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, SessionExercise};
    use crate::catalog::get_default_catalog;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn session(completed_at: Option<DateTime<Utc>>, exercises: usize) -> Session {
        let exercises: Vec<SessionExercise> = get_default_catalog()
            .iter()
            .take(exercises)
            .map(|e| SessionExercise::new(e.clone(), 30))
            .collect();
        let started_at = completed_at.unwrap_or_else(Utc::now);

        Session {
            id: Uuid::new_v4(),
            user_id: "alice".into(),
            title: "Test".into(),
            difficulty: Difficulty::Easy,
            number_of_exercises: exercises.len() as u32,
            exercise_duration: 30,
            pause_duration: 10,
            total_duration: 40 * exercises.len() as u32,
            favorite: false,
            exercises,
            started_at,
            completed_at,
            created_at: started_at,
            updated_at: started_at,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_stats_count_only_completed_sessions() {
        let sessions = vec![
            session(Some(at(2024, 3, 1, 8)), 4),
            session(Some(at(2024, 3, 2, 8)), 2),
            session(None, 10),
        ];

        let stats = user_session_stats(&sessions);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_exercises, 6);
        assert_eq!(stats.total_effort_duration, 6 * 30);
    }

    #[test]
    fn test_daily_activity_groups_by_day() {
        let sessions = vec![
            session(Some(at(2024, 3, 1, 8)), 2),
            session(Some(at(2024, 3, 1, 20)), 3),
            session(Some(at(2024, 3, 4, 8)), 1),
            session(None, 1),
        ];

        let activity = daily_activity(&sessions, &Utc);
        assert_eq!(activity.len(), 2);

        let first = &activity[&date(2024, 3, 1)];
        assert_eq!(first.sessions_count, 2);
        assert_eq!(first.total_duration, 5 * 40);
    }

    #[test]
    fn test_calendar_spans_seven_weeks_from_monday() {
        // 2024-03-14 is a Thursday
        let today = date(2024, 3, 14);
        let calendar = activity_calendar(today, &BTreeMap::new());

        assert_eq!(calendar.len(), 49);
        assert_eq!(calendar[0].date, date(2024, 1, 29));
        assert_eq!(calendar[0].date.weekday(), chrono::Weekday::Mon);
        assert_eq!(calendar.iter().filter(|d| d.is_future).count(), 3);
        assert!(!calendar.iter().find(|d| d.date == today).unwrap().is_future);
    }

    #[test]
    fn test_streaks() {
        let today = date(2024, 3, 14);
        let sessions: Vec<Session> = [
            (2024, 3, 1),
            (2024, 3, 2),
            (2024, 3, 3),
            (2024, 3, 4),
            (2024, 3, 12),
            (2024, 3, 13),
            (2024, 3, 14),
        ]
        .iter()
        .map(|(y, m, d)| session(Some(at(*y, *m, *d, 12)), 1))
        .collect();

        let calendar = activity_calendar(today, &daily_activity(&sessions, &Utc));
        let streaks = streaks(&calendar);

        assert_eq!(streaks.current, 3);
        assert_eq!(streaks.longest, 4);
        assert_eq!(streaks.last_day, Some(today));
    }

    #[test]
    fn test_no_current_streak_when_today_inactive() {
        let today = date(2024, 3, 14);
        let sessions = vec![session(Some(at(2024, 3, 13, 12)), 1)];

        let calendar = activity_calendar(today, &daily_activity(&sessions, &Utc));
        let streaks = streaks(&calendar);

        assert_eq!(streaks.current, 0);
        assert_eq!(streaks.longest, 1);
        assert_eq!(streaks.last_day, None);
    }

    #[test]
    fn test_intensity_levels() {
        let day = |total_duration| CalendarDay {
            date: date(2024, 3, 14),
            activity: Some(DayActivity {
                date: date(2024, 3, 14),
                sessions_count: 1,
                total_duration,
            }),
            is_future: false,
        };

        assert_eq!(day(0).intensity(), 0);
        assert_eq!(day(5 * 60).intensity(), 1);
        assert_eq!(day(12 * 60).intensity(), 2);
        assert_eq!(day(18 * 60).intensity(), 3);
        assert_eq!(day(40 * 60).intensity(), 4);
    }
}
