use crate::tasks::{Severity, Task};
use crate::theme::{BASE_STYLE, EMERGENCY_TASK_STYLE, NORMAL_TASK_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};
use time::Date;

/// Width of the task panel including its border
pub(crate) const PANEL_WIDTH: u16 = 30;

/// Columns between the right edge of the calendar and a panel drawn beside it
const PANEL_GAP: u16 = 2;

/// Side panel listing the tasks of a single day
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TaskPanel<'a> {
    date: Date,
    tasks: Vec<&'a Task>,
}

impl<'a> TaskPanel<'a> {
    pub(crate) fn new(date: Date, tasks: Vec<&'a Task>) -> Self {
        TaskPanel { date, tasks }
    }

    /// Number of lines needed to show every task, including the border
    pub(crate) fn height(&self) -> u16 {
        u16::try_from(self.to_text().height())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }

    fn to_text(&self) -> Text<'a> {
        if self.tasks.is_empty() {
            return Text::from(Line::raw("No tasks"));
        }
        let mut lines = Vec::new();
        for task in &self.tasks {
            let style = match task.severity {
                Severity::Emergency => EMERGENCY_TASK_STYLE,
                Severity::Normal => NORMAL_TASK_STYLE,
            };
            lines.push(Line::from(Span::styled(task.severity.label(), style)));
            lines.extend(task.todo.iter().map(|item| Line::raw(format!(" - {item}"))));
        }
        Text::from(lines)
    }
}

impl Widget for TaskPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        Paragraph::new(self.to_text())
            .block(Block::bordered().title(format!(" {} ", self.date)))
            .style(BASE_STYLE)
            .render(area, buf);
    }
}

/// Where to draw a panel of the given height: beside the calendar if the
/// terminal is wide enough, otherwise over the calendar's right edge
pub(crate) fn panel_area(area: Rect, calendar: Rect, height: u16) -> Rect {
    let width = PANEL_WIDTH.min(area.width);
    let beside = calendar.right().saturating_add(PANEL_GAP);
    let x = if beside.saturating_add(width) <= area.right() {
        beside
    } else {
        area.right() - width
    };
    Rect {
        x,
        y: area.y,
        width,
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskIndex;
    use time::macros::date;

    #[test]
    fn test_render_emergency() {
        let index = TaskIndex::sample();
        let panel = TaskPanel::new(date!(2022 - 06 - 13), index.tasks_on(date!(2022 - 06 - 13)));
        assert_eq!(panel.height(), 5);
        let area = Rect::new(0, 0, 30, 7);
        let mut buffer = Buffer::empty(area);
        panel.render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "┌ 2022-06-13 ────────────────┐",
            "│Emergency                   │",
            "│ - Write Document           │",
            "│ - Finish the project       │",
            "│                            │",
            "│                            │",
            "└────────────────────────────┘",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        expected.set_style(Rect::new(1, 1, 9, 1), EMERGENCY_TASK_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_render_no_tasks() {
        let panel = TaskPanel::new(date!(2022 - 06 - 14), Vec::new());
        assert_eq!(panel.height(), 3);
        let area = Rect::new(0, 0, 30, 3);
        let mut buffer = Buffer::empty(area);
        panel.render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "┌ 2022-06-14 ────────────────┐",
            "│No tasks                    │",
            "└────────────────────────────┘",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_height_counts_every_item() {
        let index = TaskIndex::new(vec![
            Task::new(date!(2024 - 01 - 01), ["a", "b", "c"], Severity::Normal),
            Task::new(date!(2024 - 01 - 01), ["d"], Severity::Emergency),
        ]);
        let panel = TaskPanel::new(date!(2024 - 01 - 01), index.tasks_on(date!(2024 - 01 - 01)));
        assert_eq!(panel.height(), 8);
    }

    #[test]
    fn test_panel_beside_calendar() {
        let area = Rect::new(0, 0, 120, 24);
        let calendar = Rect::new(37, 0, 46, 24);
        assert_eq!(panel_area(area, calendar, 5), Rect::new(85, 0, 30, 5));
    }

    #[test]
    fn test_panel_over_calendar() {
        let area = Rect::new(0, 0, 80, 24);
        let calendar = Rect::new(17, 0, 46, 24);
        assert_eq!(panel_area(area, calendar, 5), Rect::new(50, 0, 30, 5));
        assert_eq!(panel_area(area, calendar, 40), Rect::new(50, 0, 30, 24));
    }

    #[test]
    fn test_panel_in_narrow_terminal() {
        let area = Rect::new(0, 0, 20, 10);
        let calendar = Rect::new(0, 0, 20, 10);
        assert_eq!(panel_area(area, calendar, 5), Rect::new(0, 0, 20, 5));
    }
}
