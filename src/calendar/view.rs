use super::grid::{build_month_grid, DateCell, MonthGrid};
use super::util::OutOfTimeError;
use crate::tasks::{Severity, Task, TaskLookup};
use time::{Date, Duration, Month};

/// A cell of the displayed month together with everything a renderer needs
/// to know in order to draw it
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DecoratedCell {
    pub(crate) date: Date,
    pub(crate) in_current_month: bool,
    pub(crate) is_today: bool,
    pub(crate) is_active: bool,
    pub(crate) marker: Option<Severity>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarView<L> {
    today: Date,
    // Invariant: when set, the active date is within the displayed month
    active: Option<Date>,
    grid: MonthGrid,
    tasks: L,
}

impl<L: TaskLookup> CalendarView<L> {
    pub(crate) fn new(today: Date, tasks: L) -> Result<Self, OutOfTimeError> {
        Ok(CalendarView {
            today,
            active: Some(today),
            grid: build_month_grid(today.year(), today.month())?,
            tasks,
        })
    }

    /// Start on the given month, keeping today active if it's in that month
    pub(crate) fn start_month(mut self, year: i32, month: Month) -> Result<Self, OutOfTimeError> {
        self.jump_to_month(year, month)?;
        if (self.today.year(), self.today.month()) == (year, month) {
            self.active = Some(self.today);
        }
        Ok(self)
    }

    /// Start on the month containing `date`, with `date` active
    pub(crate) fn start_date(mut self, date: Date) -> Result<Self, OutOfTimeError> {
        self.set_active(date)?;
        Ok(self)
    }

    pub(crate) fn today(&self) -> Date {
        self.today
    }

    pub(crate) fn year(&self) -> i32 {
        self.grid.year()
    }

    pub(crate) fn month(&self) -> Month {
        self.grid.month()
    }

    /// The displayed month as an index from 0 (January) to 11 (December)
    pub(crate) fn month0(&self) -> u8 {
        u8::from(self.month()) - 1
    }

    pub(crate) fn active(&self) -> Option<Date> {
        self.active
    }

    pub(crate) fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub(crate) fn header_label(&self) -> String {
        format!("{}.{:02}", self.year(), u8::from(self.month()))
    }

    pub(crate) fn prev(&mut self) -> Result<(), OutOfTimeError> {
        self.jump_to_month0(self.year(), i32::from(self.month0()) - 1)?;
        self.clear_active();
        Ok(())
    }

    pub(crate) fn next(&mut self) -> Result<(), OutOfTimeError> {
        self.jump_to_month0(self.year(), i32::from(self.month0()) + 1)?;
        self.clear_active();
        Ok(())
    }

    /// Rebuild the grid for the displayed month
    pub(crate) fn refresh(&mut self) {
        // The displayed month always has a buildable grid, so this cannot fail
        if let Ok(grid) = build_month_grid(self.year(), self.month()) {
            self.grid = grid;
        }
    }

    /// Display the month `month0` (counted from 0) of `year`, carrying
    /// out-of-range months into the year
    pub(crate) fn jump_to_month0(&mut self, year: i32, month0: i32) -> Result<(), OutOfTimeError> {
        let (year, month) = normalize_month0(year, month0).ok_or(OutOfTimeError)?;
        self.jump_to_month(year, month)
    }

    pub(crate) fn jump_to_month(&mut self, year: i32, month: Month) -> Result<(), OutOfTimeError> {
        if (year, month) != (self.year(), self.month()) {
            self.grid = build_month_grid(year, month)?;
            log::debug!(
                "Now showing {} ({} weeks)",
                self.header_label(),
                self.grid.week_count()
            );
            if self.active.is_some_and(|d| !self.is_in_month(d)) {
                self.clear_active();
            }
        }
        Ok(())
    }

    pub(crate) fn jump_to_today(&mut self) -> Result<(), OutOfTimeError> {
        self.set_active(self.today())
    }

    pub(crate) fn set_active(&mut self, date: Date) -> Result<(), OutOfTimeError> {
        self.jump_to_month(date.year(), date.month())?;
        self.active = Some(date);
        Ok(())
    }

    pub(crate) fn clear_active(&mut self) {
        self.active = None;
    }

    /// Move the active date by the given number of days, changing months as
    /// needed.  If no date is active, the first of the month becomes active
    /// instead.
    pub(crate) fn move_active(&mut self, days: i64) -> Result<(), OutOfTimeError> {
        let target = match self.active {
            Some(date) => date
                .checked_add(Duration::days(days))
                .ok_or(OutOfTimeError)?,
            None => self
                .grid
                .current()
                .first()
                .map(|c| c.date)
                .ok_or(OutOfTimeError)?,
        };
        self.set_active(target)
    }

    pub(crate) fn active_tasks(&self) -> Vec<&Task> {
        self.active
            .map(|d| self.tasks.tasks_for(d))
            .unwrap_or_default()
    }

    pub(crate) fn decorated_cells(&self) -> impl Iterator<Item = DecoratedCell> + '_ {
        self.grid.cells().iter().map(|cell| self.decorate(cell))
    }

    pub(crate) fn decorate(&self, cell: &DateCell) -> DecoratedCell {
        DecoratedCell {
            date: cell.date,
            in_current_month: cell.in_current_month,
            is_today: cell.date == self.today,
            is_active: Some(cell.date) == self.active,
            marker: self.tasks.marker(cell.date),
        }
    }

    fn is_in_month(&self, date: Date) -> bool {
        (date.year(), date.month()) == (self.year(), self.month())
    }
}

/// Convert a year and a zero-based month index that may lie outside `0..12`
/// into a year and month.  Returns `None` if the year overflows.
pub(crate) fn normalize_month0(year: i32, month0: i32) -> Option<(i32, Month)> {
    let year = year.checked_add(month0.div_euclid(12))?;
    let month = u8::try_from(month0.rem_euclid(12) + 1).ok()?;
    Some((year, Month::try_from(month).ok()?))
}
