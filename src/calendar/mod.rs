mod grid;
mod text;
mod util;
mod view;
mod widget;
pub(crate) use self::text::render_text;
pub(crate) use self::view::CalendarView;
pub(crate) use self::widget::MonthCalendar;
