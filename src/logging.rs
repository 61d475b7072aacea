use std::{env, fmt::Display};

use colored::Colorize;
use log::{Level, LevelFilter};

/// External crates only need to log warnings and errors
const ALLOWED_EXTERNAL_LEVELS: [Level; 2] = [Level::Warn, Level::Error];

pub const LOG_VARIABLE: &str = "CUBEBEAT_LOG";

/// How much each of our targets logs, for example `info,search=debug`.
/// A bare level applies to every target, `name=level` overrides one.
#[derive(Debug, Clone, PartialEq)]
pub struct Verbosity {
    default: LevelFilter,
    overrides: Vec<(&'static str, LevelFilter)>,
    /// Parts that weren't understood, reported once logging is up
    pub rejected: Vec<String>,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self {
            default: LevelFilter::Info,
            overrides: vec![],
            rejected: vec![],
        }
    }
}

impl Verbosity {
    pub fn from_env() -> Self {
        env::var(LOG_VARIABLE)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn parse(value: &str) -> Self {
        let mut verbosity = Self::default();

        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let parsed = match part.split_once('=') {
                Some((name, level)) => match (Target::label_of(name.trim()), level.trim().parse()) {
                    (Some(label), Ok(level)) => {
                        verbosity.overrides.push((label, level));
                        true
                    }
                    _ => false,
                },
                None => match part.parse() {
                    Ok(level) => {
                        verbosity.default = level;
                        true
                    }
                    Err(_) => false,
                },
            };

            if !parsed {
                verbosity.rejected.push(part.to_string());
            }
        }

        verbosity
    }

    fn level_for(&self, target: &Target) -> LevelFilter {
        let Some(label) = target.label() else {
            return LevelFilter::Warn;
        };

        self.overrides
            .iter()
            .rev()
            .find(|(name, _)| *name == label)
            .map(|(_, level)| *level)
            .unwrap_or(self.default)
    }

    fn allows(&self, target: &Target, level: Level) -> bool {
        if target.is_local() {
            level <= self.level_for(target)
        } else {
            ALLOWED_EXTERNAL_LEVELS.contains(&level)
        }
    }
}

pub fn init_logger(verbosity: Verbosity) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::from_str(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .filter(move |meta| verbosity.allows(&Target::from_str(meta.target()), meta.level()))
        .chain(std::io::stderr())
        .apply()
}

enum Target {
    External(String),
    Core,
    Search,
    Bot,
    App,
}

impl Target {
    fn from_str(str: &str) -> Self {
        let module = str.split("::").next().unwrap_or_default();

        match module {
            "cubebeat_core" => Self::Core,
            "cubebeat_search" => Self::Search,
            "cubebeat_bot" => Self::Bot,
            "cubebeat" => Self::App,
            other => Target::External(other.to_string()),
        }
    }

    fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }

    fn label(&self) -> Option<&'static str> {
        match self {
            Target::External(_) => None,
            Target::Core => Some("core"),
            Target::Search => Some("search"),
            Target::Bot => Some("bot"),
            Target::App => Some("app"),
        }
    }

    fn label_of(name: &str) -> Option<&'static str> {
        ["core", "search", "bot", "app"]
            .into_iter()
            .find(|label| label.eq_ignore_ascii_case(name))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::Core => "CORE".blue(),
            Target::Search => "SEARCH".bright_purple(),
            Target::Bot => "BOT".bright_green(),
            Target::App => "APP".bright_cyan(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}
