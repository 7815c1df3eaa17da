use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Day of the week a block recurs on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn from_weekday(weekday: Weekday) -> Day {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }

    /// The day of `now`.
    pub fn of(now: &NaiveDateTime) -> Day {
        Day::from_weekday(now.weekday())
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn short(self) -> &'static str {
        &self.name()[..3]
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Day {
        Day::ALL[(self.index() + 1) % 7]
    }

    pub fn prev(self) -> Day {
        Day::ALL[(self.index() + 6) % 7]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts full names and three-letter abbreviations, case-insensitively.
impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Day> {
        let wanted = s.trim().to_lowercase();
        Day::ALL
            .iter()
            .copied()
            .find(|d| d.name().to_lowercase() == wanted || d.short().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidDay(s.to_string()))
    }
}

/// A wall-clock time with minute precision, stored as "HH:MM".
///
/// Ordering is numeric, which for the zero-padded string form is the same as
/// lexicographic ordering.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<ClockTime> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(ClockTime { hour, minute })
    }

    /// Truncates `now` to the minute.
    pub fn of(now: &NaiveDateTime) -> ClockTime {
        ClockTime {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<ClockTime> {
        let invalid = || Error::InvalidTime(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digit = |b: u8| if b.is_ascii_digit() { Ok(b - b'0') } else { Err(invalid()) };
        let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
        let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;
        ClockTime::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = Error;

    fn try_from(value: String) -> Result<ClockTime> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> String {
        value.to_string()
    }
}

/// A single scheduled block recurring weekly on one day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// The weekday this block recurs on.
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Display label.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Cleared at every weekly reset.
    #[serde(default)]
    pub completed: bool,
    /// Palette tag, see [`PaletteColor`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Task {
    /// Whether the block starts strictly before it ends.
    pub fn is_well_formed(&self) -> bool {
        self.start_time < self.end_time
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}

/// A task record as found on disk.
///
/// Older files may lack `completed` and `color`, and nothing guarantees the
/// times are well formed, so every field is loose until [`RawTask::normalize`].
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
}

impl RawTask {
    /// Converts a loaded record into a fully typed task.
    ///
    /// A missing `completed` becomes `false` and an empty note becomes `None`.
    /// A blank name is rejected like a malformed time.
    pub fn normalize(self) -> Result<Task> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTask(format!("task {} has an empty name", self.id)));
        }
        let day = self.day.parse()?;
        let start_time = self.start_time.parse()?;
        let end_time = self.end_time.parse()?;
        Ok(Task {
            id: self.id,
            day,
            start_time,
            end_time,
            name: self.name,
            note: self.note.filter(|n| !n.trim().is_empty()),
            completed: self.completed.unwrap_or(false),
            color: self.color.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// The user-editable fields of a block, as submitted by the CLI or the TUI.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub day: Day,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub name: String,
    pub note: Option<String>,
    pub color: Option<String>,
}

impl TaskDraft {
    /// Checks the name is non-empty and the block does not span midnight.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTask("name must not be empty".into()));
        }
        if self.start_time >= self.end_time {
            return Err(Error::InvalidTask(format!(
                "start {} must be before end {}",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }

    /// Builds a task from this draft, keeping `id` and `completed` from the caller.
    pub fn into_task(self, id: String, completed: bool) -> Task {
        Task {
            id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            name: self.name.trim().to_string(),
            note: self.note.filter(|n| !n.trim().is_empty()),
            completed,
            color: self.color,
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> TaskDraft {
        TaskDraft {
            day: task.day,
            start_time: task.start_time,
            end_time: task.end_time,
            name: task.name.clone(),
            note: task.note.clone(),
            color: task.color.clone(),
        }
    }
}

/// The fixed colour palette used to tag blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteColor {
    Indigo,
    Emerald,
    Amber,
    Rose,
    Sky,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 5] = [
        PaletteColor::Indigo,
        PaletteColor::Emerald,
        PaletteColor::Amber,
        PaletteColor::Rose,
        PaletteColor::Sky,
    ];

    /// Maps a stored tag to a palette entry; absent or unknown tags fall back to indigo.
    pub fn resolve(tag: Option<&str>) -> PaletteColor {
        tag.and_then(|t| {
            PaletteColor::ALL
                .iter()
                .copied()
                .find(|c| c.name().eq_ignore_ascii_case(t.trim()))
        })
        .unwrap_or(PaletteColor::Indigo)
    }

    pub const fn name(self) -> &'static str {
        match self {
            PaletteColor::Indigo => "indigo",
            PaletteColor::Emerald => "emerald",
            PaletteColor::Amber => "amber",
            PaletteColor::Rose => "rose",
            PaletteColor::Sky => "sky",
        }
    }

    pub fn next(self) -> PaletteColor {
        let i = PaletteColor::ALL.iter().position(|c| *c == self).unwrap_or(0);
        PaletteColor::ALL[(i + 1) % PaletteColor::ALL.len()]
    }
}
