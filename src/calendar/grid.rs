use super::util::{OutOfTimeError, DAYS_IN_WEEK};
use std::slice::Chunks;
use time::{Date, Month, Weekday};

pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
    }
}

pub(crate) fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        m => (year, m.previous()),
    }
}

pub(crate) fn next_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        m => (year, m.next()),
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DateCell {
    pub(crate) date: Date,
    pub(crate) in_current_month: bool,
}

/// The days shown for one month: whole weeks from the Sunday on or before the
/// 1st through the Saturday on or after the last day
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    year: i32,
    month: Month,
    // Invariant: len() is a nonzero multiple of DAYS_IN_WEEK
    cells: Vec<DateCell>,
    leading: usize,
    trailing: usize,
}

impl MonthGrid {
    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn cells(&self) -> &[DateCell] {
        &self.cells
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn leading(&self) -> &[DateCell] {
        self.cells.get(..self.leading).unwrap_or_default()
    }

    pub(crate) fn current(&self) -> &[DateCell] {
        let start = self.leading().len();
        let end = self.len() - self.trailing().len();
        self.cells.get(start..end).unwrap_or_default()
    }

    pub(crate) fn trailing(&self) -> &[DateCell] {
        self.cells
            .get(self.cells.len() - self.trailing..)
            .unwrap_or_default()
    }

    pub(crate) fn weeks(&self) -> Chunks<'_, DateCell> {
        self.cells.chunks(DAYS_IN_WEEK)
    }

    pub(crate) fn week_count(&self) -> usize {
        self.cells.len() / DAYS_IN_WEEK
    }

    pub(crate) fn first(&self) -> Date {
        self.cells.first().map_or_else(|| self.month_start(), |c| c.date)
    }

    pub(crate) fn last(&self) -> Date {
        self.cells.last().map_or_else(|| self.month_start(), |c| c.date)
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        (self.first()..=self.last()).contains(&date)
    }

    /// Returns the row and weekday at which `date` is displayed
    pub(crate) fn position(&self, date: Date) -> Option<(usize, Weekday)> {
        if !self.contains(date) {
            return None;
        }
        let offset = usize::try_from((date - self.first()).whole_days()).ok()?;
        Some((offset / DAYS_IN_WEEK, date.weekday()))
    }

    fn month_start(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }
}

/// Build the grid of date cells for the given month.  Fails only when the
/// grid would include a day outside the range of representable dates.
pub(crate) fn build_month_grid(year: i32, month: Month) -> Result<MonthGrid, OutOfTimeError> {
    let first = Date::from_calendar_date(year, month, 1).map_err(|_| OutOfTimeError)?;
    let first_weekday = first.weekday().number_days_from_sunday();

    let (prev_year, prev_month) = previous_month(year, month);
    let prev_days = days_in_month(prev_year, prev_month);
    let mut cells = Vec::with_capacity(DAYS_IN_WEEK * 6);
    for i in (1..=first_weekday).rev() {
        cells.push(DateCell {
            date: Date::from_calendar_date(prev_year, prev_month, prev_days - i + 1)
                .map_err(|_| OutOfTimeError)?,
            in_current_month: false,
        });
    }
    let leading = cells.len();

    for day in 1..=days_in_month(year, month) {
        cells.push(DateCell {
            date: Date::from_calendar_date(year, month, day).map_err(|_| OutOfTimeError)?,
            in_current_month: true,
        });
    }

    let remainder = cells.len() % DAYS_IN_WEEK;
    let mut trailing = 0;
    if remainder != 0 {
        let (next_year, next_month) = next_month(year, month);
        for day in 1..=DAYS_IN_WEEK - remainder {
            let day = u8::try_from(day).map_err(|_| OutOfTimeError)?;
            cells.push(DateCell {
                date: Date::from_calendar_date(next_year, next_month, day)
                    .map_err(|_| OutOfTimeError)?,
                in_current_month: false,
            });
            trailing += 1;
        }
    }

    Ok(MonthGrid {
        year,
        month,
        cells,
        leading,
        trailing,
    })
}
