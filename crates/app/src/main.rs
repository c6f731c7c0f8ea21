use std::fmt;
use std::time::Duration;

use services::{AppServices, Clock, MoviesFeedConfig, SourceKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod play;

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
const DEFAULT_ANSWER_DELAY_MS: u64 = 1000;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSource { raw: String },
    InvalidDelay { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSource { raw } => write!(f, "invalid --source value: {raw}"),
            ArgsError::InvalidDelay { raw } => write!(f, "invalid --answer-delay-ms value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play  [--db <sqlite_url>] [--source static|remote] [--answer-delay-ms <n>]");
    eprintln!("  cargo run -p app -- stats [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- reset [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --source static");
    eprintln!("  --answer-delay-ms {DEFAULT_ANSWER_DELAY_MS}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_SOURCE, QUIZ_ANSWER_DELAY_MS");
    eprintln!("  QUIZ_API_KEY, QUIZ_FEED_URL  (remote source)");
    eprintln!("  RUST_LOG                     (log filter, default: warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    source: SourceKind,
    answer_delay: Duration,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.into()),
        );
        let mut source: SourceKind = match std::env::var("QUIZ_SOURCE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ArgsError::InvalidSource { raw: raw.clone() })?,
            Err(_) => SourceKind::default(),
        };
        let mut delay_ms = match std::env::var("QUIZ_ANSWER_DELAY_MS") {
            Ok(raw) => parse_delay(raw)?,
            Err(_) => DEFAULT_ANSWER_DELAY_MS,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--source" => {
                    let value = require_value(args, "--source")?;
                    source = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSource { raw: value.clone() })?;
                }
                "--answer-delay-ms" => {
                    delay_ms = parse_delay(require_value(args, "--answer-delay-ms")?)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            source,
            answer_delay: Duration::from_millis(delay_ms),
        })
    }
}

fn parse_delay(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidDelay { raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_string();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let source = if cmd == Command::Play {
        parsed.source
    } else {
        SourceKind::Static
    };
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::system(),
        source,
        MoviesFeedConfig::from_env(),
    )
    .await?;
    info!(db = %parsed.db_url, ?source, "services ready");

    match cmd {
        Command::Play => play::run(&services, parsed.answer_delay).await,
        Command::Stats => {
            let stats = services.statistics().snapshot().await;
            println!("{}", play::format_stats(&stats));
            Ok(())
        }
        Command::Reset => {
            services.statistics().reset().await?;
            println!("Статистика сброшена.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_flags() {
        let args = parse(&[
            "--db",
            "sqlite:///tmp/quiz.sqlite3",
            "--source",
            "remote",
            "--answer-delay-ms",
            "0",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/quiz.sqlite3");
        assert_eq!(args.source, SourceKind::Remote);
        assert_eq!(args.answer_delay, Duration::ZERO);
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(matches!(
            parse(&["--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(&["--source", "ftp"]),
            Err(ArgsError::InvalidSource { .. })
        ));
        assert!(matches!(
            parse(&["--answer-delay-ms", "soon"]),
            Err(ArgsError::InvalidDelay { .. })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }

    #[test]
    fn default_and_url_form_paths_are_made_absolute() {
        let url = normalize_sqlite_url(DEFAULT_DB_URL.into());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("/quiz.sqlite3"), "{url}");

        let url = normalize_sqlite_url("sqlite://data/quiz.sqlite3?mode=rwc".into());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/quiz.sqlite3?mode=rwc"), "{url}");

        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.sqlite3".into()),
            "sqlite:///tmp/quiz.sqlite3"
        );
    }

    #[test]
    fn commands_map_from_args() {
        assert_eq!(Command::from_arg("stats"), Some(Command::Stats));
        assert_eq!(Command::from_arg("reset"), Some(Command::Reset));
        assert_eq!(Command::from_arg("ui"), None);
    }
}
