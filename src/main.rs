mod app;
mod calendar;
mod config;
mod help;
mod jumpto;
mod panel;
mod tasks;
mod theme;
use crate::app::App;
use crate::calendar::{render_text, CalendarView};
use crate::config::Config;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::PathBuf;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum StartAt {
    Today,
    Month(i32, time::Month),
    Date(Date),
}

impl StartAt {
    fn parse(value: &str) -> Result<StartAt, time::error::Parse> {
        match Date::parse(value, &YMD_FMT) {
            Ok(d) => Ok(StartAt::Date(d)),
            Err(e) => match Date::parse(&format!("{value}-01"), &YMD_FMT) {
                Ok(d) => Ok(StartAt::Month(d.year(), d.month())),
                Err(_) => Err(e),
            },
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        start: StartAt,
        config: Option<PathBuf>,
        tasks: Option<PathBuf>,
        print: bool,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut start = None;
        let mut config = None;
        let mut tasks = None;
        let mut print = false;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('t') | Arg::Long("tasks") => {
                    tasks = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('p') | Arg::Long("print") => print = true,
                Arg::Value(value) if start.is_none() => {
                    let value = value.string()?;
                    match StartAt::parse(&value) {
                        Ok(s) => start = Some(s),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            start: start.unwrap_or(StartAt::Today),
            config,
            tasks,
            print,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                start,
                config,
                tasks,
                print,
            } => {
                let config_path = match config {
                    Some(path) => path,
                    None => Config::default_path()?,
                };
                let mut config = Config::load(&config_path)
                    .with_context(|| format!("load config {}", config_path.display()))?;
                if tasks.is_some() {
                    config.tasks.path = tasks;
                }
                init_logging(&config, !print)?;
                let tasks = config.load_tasks(config_path.parent())?;
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let view = CalendarView::new(today, tasks)?;
                let view = match start {
                    StartAt::Today => view,
                    StartAt::Month(year, month) => view.start_month(year, month)?,
                    StartAt::Date(date) => view.start_date(date)?,
                };
                if print {
                    print!("{}", render_text(&view));
                    Ok(())
                } else {
                    with_terminal(|mut terminal| {
                        terminal.hide_cursor().context("failed to hide cursor")?;
                        App::new(view).run(terminal)?;
                        Ok(())
                    })
                }
            }
            Command::Help => {
                println!("Usage: taskcal [options] [YYYY-MM | YYYY-MM-DD]");
                println!();
                println!("Terminal month calendar that marks days with tasks");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>   Read configuration from PATH");
                println!("  -t, --tasks <PATH>    Read tasks from PATH");
                println!("  -p, --print           Print the month as plain text and exit");
                println!("  -h, --help            Display this help message and exit");
                println!("  -V, --version         Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

// While the terminal UI is up, log records can only go to a file
fn init_logging(config: &Config, interactive: bool) -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or(config.log_level());
    let mut builder = env_logger::Builder::from_env(env);
    match &config.log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if interactive => return Ok(()),
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.try_init().context("failed to initialize logging")?;
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_args(args.iter().copied()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(
            parse(&[]).unwrap(),
            Command::Run {
                start: StartAt::Today,
                config: None,
                tasks: None,
                print: false,
            }
        );
    }

    #[test]
    fn test_month_arg() {
        assert_eq!(
            parse(&["-p", "2022-06"]).unwrap(),
            Command::Run {
                start: StartAt::Month(2022, time::Month::June),
                config: None,
                tasks: None,
                print: true,
            }
        );
    }

    #[test]
    fn test_date_arg() {
        assert_eq!(
            parse(&["--tasks", "t.toml", "-c", "c.toml", "2022-06-13"]).unwrap(),
            Command::Run {
                start: StartAt::Date(date!(2022 - 06 - 13)),
                config: Some(PathBuf::from("c.toml")),
                tasks: Some(PathBuf::from("t.toml")),
                print: false,
            }
        );
    }

    #[test]
    fn test_bad_date_arg() {
        assert!(matches!(
            parse(&["2022-13"]),
            Err(lexopt::Error::ParsingFailed { .. })
        ));
        assert!(matches!(
            parse(&["June"]),
            Err(lexopt::Error::ParsingFailed { .. })
        ));
    }

    #[test]
    fn test_extra_positional() {
        assert!(parse(&["2022-06", "2022-07"]).is_err());
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["-p", "--help"]).unwrap(), Command::Help);
        assert_eq!(parse(&["-V"]).unwrap(), Command::Version);
    }
}
