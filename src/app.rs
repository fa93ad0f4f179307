use crate::calendar::{CalendarView, MonthCalendar};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::panel::{panel_area, TaskPanel};
use crate::tasks::TaskLookup;
use crate::theme::BASE_STYLE;
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct App<L> {
    view: CalendarView<L>,
    state: AppState,
    show_panel: bool,
}

impl<L: TaskLookup> App<L> {
    pub(crate) fn new(view: CalendarView<L>) -> App<L> {
        App {
            view,
            state: AppState::Calendar,
            show_panel: false,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.view.move_active(-1).is_ok(),
                KeyCode::Char('l') | KeyCode::Right => self.view.move_active(1).is_ok(),
                KeyCode::Char('k') | KeyCode::Up => self.view.move_active(-7).is_ok(),
                KeyCode::Char('j') | KeyCode::Down => self.view.move_active(7).is_ok(),
                KeyCode::Char('p' | '<') | KeyCode::PageUp => {
                    self.show_panel = false;
                    self.view.prev().is_ok()
                }
                KeyCode::Char('n' | '>') | KeyCode::PageDown => {
                    self.show_panel = false;
                    self.view.next().is_ok()
                }
                KeyCode::Char('0') | KeyCode::Home => self.view.jump_to_today().is_ok(),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    if self.view.active().is_some() {
                        self.show_panel = !self.show_panel;
                        true
                    } else {
                        false
                    }
                }
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    if self.show_panel {
                        self.show_panel = false;
                    } else {
                        self.state = AppState::Quitting;
                    }
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char('-') => state.handle_input(JumpToInput::Negative),
                        KeyCode::Char('+') => state.handle_input(JumpToInput::Positive),
                        KeyCode::Char(c @ '0'..='9') => match c
                            .to_digit(10)
                            .and_then(|d| u8::try_from(d).ok())
                        {
                            Some(d) => state.handle_input(JumpToInput::Digit(d)),
                            None => JumpToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(year, month) => {
                            self.state = AppState::Calendar;
                            self.show_panel = false;
                            log::debug!("Going to {year}-{:02}", u8::from(month));
                            self.view.jump_to_month(year, month).is_ok()
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

impl<L: TaskLookup> Widget for &mut App<L> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        MonthCalendar::<L>::new().render(area, buf, &mut self.view);
        if self.show_panel {
            if let Some(date) = self.view.active() {
                let panel = TaskPanel::new(date, self.view.active_tasks());
                let panel_rect = panel_area(
                    area,
                    MonthCalendar::<L>::area_within(area),
                    panel.height(),
                );
                panel.render(panel_rect, buf);
            }
        }
        if self.state == AppState::Helping {
            Help.render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskIndex;
    use time::macros::date;

    fn app() -> App<TaskIndex> {
        let view = CalendarView::new(date!(2022 - 06 - 20), TaskIndex::sample()).unwrap();
        App::new(view)
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
            .collect()
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.view.header_label(), "2022.07");
        assert!(app.handle_key(KeyCode::PageUp));
        assert!(app.handle_key(KeyCode::Char('p')));
        assert_eq!(app.view.header_label(), "2022.05");
        assert_eq!(app.view.active(), None);
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.view.active(), Some(date!(2022 - 06 - 20)));
    }

    #[test]
    fn test_moving_active_day() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('k')));
        assert_eq!(app.view.active(), Some(date!(2022 - 06 - 13)));
        assert!(app.handle_key(KeyCode::Left));
        assert_eq!(app.view.active(), Some(date!(2022 - 06 - 12)));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert_eq!(app.view.active(), Some(date!(2022 - 07 - 03)));
        assert_eq!(app.view.header_label(), "2022.07");
    }

    #[test]
    fn test_panel_toggle() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.show_panel);
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.show_panel);
        assert_eq!(app.state, AppState::Calendar);
        assert!(app.handle_key(KeyCode::Char(' ')));
        assert!(app.handle_key(KeyCode::Char('n')));
        assert!(!app.show_panel);
        assert!(!app.handle_key(KeyCode::Enter), "no day is active");
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.quitting());
        assert!(!app.handle_key(KeyCode::Char('n')));
    }

    #[test]
    fn test_invalid_key() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_help_dismissed_by_any_key() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Helping);
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_go_to_month() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('g')));
        for c in "199912".chars() {
            assert!(app.handle_key(KeyCode::Char(c)));
        }
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.view.header_label(), "1999.12");
    }

    #[test]
    fn test_go_to_month_cancelled() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('g')));
        assert!(app.handle_key(KeyCode::Char('1')));
        assert!(!app.handle_key(KeyCode::Char('x')));
        assert!(app.handle_key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.view.header_label(), "2022.06");
    }

    #[test]
    fn test_render_with_panel() {
        let mut app = app();
        app.handle_key(KeyCode::Char('k'));
        app.handle_key(KeyCode::Enter);
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        assert_eq!(
            row(&buffer, 0),
            format!("{:36}2022.06       ┌ 2022-06-13 ────────────────┐", "")
        );
        assert!(row(&buffer, 1).ends_with("│Emergency                   │"));
        assert!(row(&buffer, 4).ends_with("└────────────────────────────┘"));
    }

    #[test]
    fn test_render_is_stable_across_draws() {
        let mut app = app();
        let area = Rect::new(0, 0, 100, 30);
        let mut first = Buffer::empty(area);
        app.render(area, &mut first);
        let mut second = Buffer::empty(area);
        app.render(area, &mut second);
        assert_eq!(first, second);
    }
}
