use super::util::WeekdayExt;
use super::view::{CalendarView, DecoratedCell};
use crate::tasks::{Severity, TaskLookup};
use crate::theme::{
    BASE_STYLE, EMERGENCY_TASK_STYLE, NORMAL_TASK_STYLE, OTHER_MONTH_STYLE, TITLE_STYLE,
    WEEKDAY_STYLE,
};
use ratatui::{prelude::*, widgets::*};
use std::marker::PhantomData;
use time::Weekday;

static HEADER: &str = " Su     Mo     Tu     We     Th     Fr     Sa ";

/// Width of the calendar in columns
pub(crate) const MAIN_WIDTH: u16 = 46;

/// Number of lines taken up by the month label, the weekday header, and the
/// rule beneath them
const HEADER_LINES: u16 = 3;

/// Number of lines taken up by each week of the calendar: the day numbers and
/// the task markers beneath them
const WEEK_LINES: u16 = 2;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

/// Column within a day at which its task marker is drawn
const MARKER_OFFSET: u16 = 2;

const MARKER: &str = "•";

const ACS_HLINE: char = '─';

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthCalendar<L> {
    _data: PhantomData<L>,
}

impl<L> MonthCalendar<L> {
    pub(crate) fn new() -> MonthCalendar<L> {
        MonthCalendar { _data: PhantomData }
    }

    /// The part of `area` that the calendar is drawn in: a column of
    /// `MAIN_WIDTH` cells centered horizontally
    pub(crate) fn area_within(area: Rect) -> Rect {
        let left = area.width.saturating_sub(MAIN_WIDTH) / 2;
        Rect {
            x: area.x + left,
            y: area.y,
            width: MAIN_WIDTH.min(area.width),
            height: area.height,
        }
    }
}

impl<L: TaskLookup> StatefulWidget for MonthCalendar<L> {
    type State = CalendarView<L>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = Self::area_within(area);
        state.refresh();
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(&state.header_label());
        canvas.draw_header();
        for cell in state.decorated_cells() {
            if let Some((row, weekday)) = state.grid().position(cell.date) {
                canvas.draw_day(row, weekday, &cell);
            }
        }
    }
}

fn day_style(cell: &DecoratedCell) -> Style {
    let mut style = if cell.in_current_month {
        BASE_STYLE
    } else {
        OTHER_MONTH_STYLE
    };
    if cell.is_today {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if cell.is_active {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

fn marker_style(severity: Severity) -> Style {
    match severity {
        Severity::Emergency => EMERGENCY_TASK_STYLE,
        Severity::Normal => NORMAL_TASK_STYLE,
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, label: &str) {
        let width = u16::try_from(label.chars().count()).unwrap_or(u16::MAX);
        self.mvprint(
            0,
            MAIN_WIDTH.saturating_sub(width) / 2,
            label,
            Some(TITLE_STYLE),
        );
    }

    fn draw_header(&mut self) {
        self.mvprint(1, 0, HEADER, Some(WEEKDAY_STYLE));
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, row: usize, weekday: Weekday, cell: &DecoratedCell) {
        let Ok(row) = u16::try_from(row) else {
            return;
        };
        let y = row * WEEK_LINES + HEADER_LINES;
        let x = DAY_WIDTH * weekday.index0();
        let s = if cell.is_active {
            format!("[{:2}]", cell.date.day())
        } else {
            format!(" {:2} ", cell.date.day())
        };
        self.mvprint(y, x, s, Some(day_style(cell)));
        if let Some(severity) = cell.marker {
            self.mvprint(y + 1, x + MARKER_OFFSET, MARKER, Some(marker_style(severity)));
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskIndex;
    use time::macros::date;

    fn june_2022() -> CalendarView<TaskIndex> {
        let mut view = CalendarView::new(date!(2022 - 06 - 20), TaskIndex::sample()).unwrap();
        view.set_active(date!(2022 - 06 - 12)).unwrap();
        view
    }

    #[test]
    fn test_render_june_2022() {
        let mut view = june_2022();
        let area = Rect::new(0, 0, 46, 13);
        let mut buffer = Buffer::empty(area);
        buffer.set_style(area, BASE_STYLE);
        MonthCalendar::new().render(area, &mut buffer, &mut view);
        let mut expected = Buffer::with_lines([
            "                   2022.06                    ",
            " Su     Mo     Tu     We     Th     Fr     Sa ",
            "──────────────────────────────────────────────",
            " 29     30     31      1      2      3      4 ",
            "                                              ",
            "  5      6      7      8      9     10     11 ",
            "                                              ",
            "[12]    13     14     15     16     17     18 ",
            "  •      •                                    ",
            " 19     20     21     22     23     24     25 ",
            "                                            • ",
            " 26     27     28     29     30      1      2 ",
            "                                              ",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        expected.set_style(Rect::new(19, 0, 7, 1), TITLE_STYLE);
        expected.set_style(Rect::new(0, 1, 46, 1), WEEKDAY_STYLE);
        expected.set_style(Rect::new(0, 3, 4, 1), OTHER_MONTH_STYLE);
        expected.set_style(Rect::new(7, 3, 4, 1), OTHER_MONTH_STYLE);
        expected.set_style(Rect::new(14, 3, 4, 1), OTHER_MONTH_STYLE);
        expected.set_style(
            Rect::new(0, 7, 4, 1),
            BASE_STYLE.add_modifier(Modifier::BOLD),
        );
        expected.set_style(Rect::new(2, 8, 1, 1), NORMAL_TASK_STYLE);
        expected.set_style(Rect::new(9, 8, 1, 1), EMERGENCY_TASK_STYLE);
        expected.set_style(
            Rect::new(7, 9, 4, 1),
            BASE_STYLE.add_modifier(Modifier::UNDERLINED),
        );
        expected.set_style(Rect::new(44, 10, 1, 1), NORMAL_TASK_STYLE);
        expected.set_style(Rect::new(35, 11, 4, 1), OTHER_MONTH_STYLE);
        expected.set_style(Rect::new(42, 11, 4, 1), OTHER_MONTH_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut view = june_2022();
        let area = Rect::new(0, 0, 60, 15);
        let mut first = Buffer::empty(area);
        MonthCalendar::new().render(area, &mut first, &mut view);
        let mut second = Buffer::empty(area);
        MonthCalendar::new().render(area, &mut second, &mut view);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_truncated() {
        let mut view = june_2022();
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        MonthCalendar::new().render(area, &mut buffer, &mut view);
        let mut expected = Buffer::with_lines([
            "                   2",
            " Su     Mo     Tu   ",
            "────────────────────",
            " 29     30     31   ",
            "                    ",
        ]);
        expected.set_style(Rect::new(19, 0, 1, 1), TITLE_STYLE);
        expected.set_style(Rect::new(0, 1, 20, 1), WEEKDAY_STYLE);
        expected.set_style(Rect::new(0, 3, 4, 1), OTHER_MONTH_STYLE);
        expected.set_style(Rect::new(7, 3, 4, 1), OTHER_MONTH_STYLE);
        expected.set_style(Rect::new(14, 3, 4, 1), OTHER_MONTH_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_area_within() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(
            MonthCalendar::<TaskIndex>::area_within(area),
            Rect::new(17, 0, 46, 24)
        );
        let area = Rect::new(5, 2, 30, 10);
        assert_eq!(
            MonthCalendar::<TaskIndex>::area_within(area),
            Rect::new(5, 2, 30, 10)
        );
    }
}
