use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use time::{
    format_description::FormatItem,
    macros::{date, format_description},
    Date, OffsetDateTime, PrimitiveDateTime,
};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[serde(rename_all = "lowercase")]
// Variants are ordered most severe first
pub(crate) enum Severity {
    Emergency,
    #[default]
    Normal,
}

impl Severity {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Severity::Emergency => "Emergency",
            Severity::Normal => "Normal",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(try_from = "RawTask")]
pub(crate) struct Task {
    pub(crate) date: Date,
    pub(crate) todo: Vec<String>,
    pub(crate) severity: Severity,
}

impl Task {
    pub(crate) fn new<I, S>(date: Date, todo: I, severity: Severity) -> Task
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Task {
            date,
            todo: todo.into_iter().map(Into::into).collect(),
            severity,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
struct RawTask {
    date: String,
    #[serde(default)]
    todo: Vec<String>,
    #[serde(default)]
    severity: Severity,
}

impl TryFrom<RawTask> for Task {
    type Error = TaskFileError;

    fn try_from(raw: RawTask) -> Result<Task, TaskFileError> {
        Ok(Task {
            date: parse_day(&raw.date)?,
            todo: raw.todo,
            severity: raw.severity,
        })
    }
}

/// Parse a `YYYY-MM-DD` date, ignoring any time of day that follows it after
/// a `T` or a space
pub(crate) fn parse_day(s: &str) -> Result<Date, TaskFileError> {
    let day = s.trim().split(['T', ' ']).next().unwrap_or_default();
    Date::parse(day, &YMD_FMT).map_err(|source| TaskFileError::Date {
        value: s.to_owned(),
        source,
    })
}

/// Anything that falls on a calendar day.  Lookups in a [`TaskIndex`] only
/// ever compare the day; an absent value matches nothing.
pub(crate) trait OnDay {
    fn calendar_day(&self) -> Option<Date>;
}

impl OnDay for Date {
    fn calendar_day(&self) -> Option<Date> {
        Some(*self)
    }
}

impl OnDay for PrimitiveDateTime {
    fn calendar_day(&self) -> Option<Date> {
        Some(self.date())
    }
}

impl OnDay for OffsetDateTime {
    fn calendar_day(&self) -> Option<Date> {
        Some(self.date())
    }
}

impl<T: OnDay> OnDay for Option<T> {
    fn calendar_day(&self) -> Option<Date> {
        self.as_ref().and_then(OnDay::calendar_day)
    }
}

impl<T: OnDay + ?Sized> OnDay for &T {
    fn calendar_day(&self) -> Option<Date> {
        (**self).calendar_day()
    }
}

/// Source of the tasks shown on the calendar
pub(crate) trait TaskLookup {
    fn tasks_for(&self, date: Date) -> Vec<&Task>;

    /// How the cell for `date` is marked: by its most severe task, if any
    fn marker(&self, date: Date) -> Option<Severity> {
        self.tasks_for(date).iter().map(|t| t.severity).min()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct TaskIndex {
    tasks: Vec<Task>,
    by_day: BTreeMap<Date, Vec<usize>>,
}

impl TaskIndex {
    pub(crate) fn new(tasks: Vec<Task>) -> TaskIndex {
        let mut by_day = BTreeMap::<Date, Vec<usize>>::new();
        for (i, t) in tasks.iter().enumerate() {
            by_day.entry(t.date).or_default().push(i);
        }
        TaskIndex { tasks, by_day }
    }

    pub(crate) fn load(path: &Path) -> Result<TaskIndex, TaskFileError> {
        let src = fs::read_to_string(path).map_err(|source| TaskFileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let index = TaskIndex::parse(&src)?;
        log::info!("Loaded {} tasks from {}", index.len(), path.display());
        Ok(index)
    }

    pub(crate) fn parse(src: &str) -> Result<TaskIndex, TaskFileError> {
        let file = toml::from_str::<TaskFile>(src)?;
        Ok(TaskIndex::new(file.task))
    }

    pub(crate) fn sample() -> TaskIndex {
        TaskIndex::new(vec![
            Task::new(
                date!(2022 - 06 - 12),
                ["Have Meeting", "Develop a project"],
                Severity::Normal,
            ),
            Task::new(
                date!(2022 - 06 - 13),
                ["Write Document", "Finish the project"],
                Severity::Emergency,
            ),
            Task::new(date!(2022 - 06 - 25), ["learn TypeScript"], Severity::Normal),
            Task::new(date!(2022 - 07 - 07), ["learn Vue3"], Severity::Normal),
        ])
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn tasks_on<D: OnDay>(&self, date: D) -> Vec<&Task> {
        let Some(day) = date.calendar_day() else {
            return Vec::new();
        };
        self.by_day
            .get(&day)
            .map(|ixs| ixs.iter().filter_map(|&i| self.tasks.get(i)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn has_task<D: OnDay>(&self, date: D) -> bool {
        !self.tasks_on(date).is_empty()
    }

    pub(crate) fn has_emergency<D: OnDay>(&self, date: D) -> bool {
        self.tasks_on(date)
            .iter()
            .any(|t| t.severity == Severity::Emergency)
    }
}

impl TaskLookup for TaskIndex {
    fn tasks_for(&self, date: Date) -> Vec<&Task> {
        self.tasks_on(date)
    }

    fn marker(&self, date: Date) -> Option<Severity> {
        if self.has_emergency(date) {
            Some(Severity::Emergency)
        } else if self.has_task(date) {
            Some(Severity::Normal)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
struct TaskFile {
    #[serde(default)]
    task: Vec<Task>,
}

#[derive(Debug, Error)]
pub(crate) enum TaskFileError {
    #[error("failed to read task file {path}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse task file")]
    Toml(#[from] toml::de::Error),
    #[error("invalid task date {value:?}")]
    Date {
        value: String,
        source: time::error::Parse,
    },
}
