use super::util::DAYS_IN_WEEK;
use super::view::{CalendarView, DecoratedCell};
use crate::tasks::{Severity, TaskLookup};
use std::fmt::{self, Write};

static HEADER: &str = " Su  Mo  Tu  We  Th  Fr  Sa";

/// Number of columns per day: the right-aligned day number followed by a
/// marker column
const DAY_WIDTH: usize = 4;

/// Plain-text rendering of a month, in the manner of `cal(1)`.  Days outside
/// the month are left blank; days with tasks are followed by `*`, or by `!`
/// if any of their tasks is an emergency.
#[derive(Debug)]
pub(crate) struct TextCalendar<'a, L>(&'a CalendarView<L>);

pub(crate) fn render_text<L: TaskLookup>(view: &CalendarView<L>) -> TextCalendar<'_, L> {
    TextCalendar(view)
}

impl<L: TaskLookup> fmt::Display for TextCalendar<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.0.header_label();
        let pad = (DAY_WIDTH * DAYS_IN_WEEK).saturating_sub(label.len()) / 2;
        writeln!(f, "{:pad$}{label}", "")?;
        writeln!(f, "{HEADER}")?;
        for week in self.0.grid().weeks() {
            let mut line = String::new();
            for cell in week {
                show_cell(&mut line, &self.0.decorate(cell))?;
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

fn show_cell(line: &mut String, cell: &DecoratedCell) -> fmt::Result {
    if !cell.in_current_month {
        return write!(line, "{:width$}", "", width = DAY_WIDTH);
    }
    let mark = match cell.marker {
        Some(Severity::Emergency) => '!',
        Some(Severity::Normal) => '*',
        None => ' ',
    };
    write!(line, "{:3}{mark}", cell.date.day())
}
