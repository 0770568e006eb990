use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, Clock};
use storage::http::ApiConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://olympiad.sqlite3";
const DEFAULT_LOG_FILTER: &str = "info,storage=debug,services=debug";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingApiUrl,
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingApiUrl => {
                write!(f, "an API base URL is required (--api or OLYMPIAD_API_URL)")
            }
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
    eprintln!("  cargo run -p app -- --api <base_url> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  OLYMPIAD_API_URL, OLYMPIAD_DB_URL, RUST_LOG");
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    api_url: String,
    db_url: String,
}

enum Parsed {
    Run(Args),
    Help,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env_api: Option<String>,
        env_db: Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut api_url = env_api.filter(|value| !value.trim().is_empty());
        let mut db_url = env_db.map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => api_url = Some(require_value(args, "--api")?),
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let api_url = api_url.ok_or(ArgsError::MissingApiUrl)?;
        Ok(Parsed::Run(Self { api_url, db_url }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    log_fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(
        &mut argv,
        std::env::var("OLYMPIAD_API_URL").ok(),
        std::env::var("OLYMPIAD_DB_URL").ok(),
    )
    .inspect_err(|_| print_usage())?;
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    let api = ApiConfig::new(&args.api_url)?;

    // Local progress and the remembered login live in SQLite; everything else is remote.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::connect(api, &args.db_url, Clock::default_clock()).await?;
    let restored = services.auth().restore().await;
    info!(
        db = %args.db_url,
        restored = restored.is_some(),
        "services ready"
    );

    let context = build_app_context(Arc::new(services), restored);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Olympiad")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env_api: Option<&str>) -> Result<Parsed, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(&mut iter, env_api.map(str::to_string), None)
    }

    #[test]
    fn api_flag_overrides_environment() {
        let Ok(Parsed::Run(args)) = parse(
            &["--api", "https://flag.example"],
            Some("https://env.example"),
        ) else {
            panic!("expected parsed args");
        };
        assert_eq!(args.api_url, "https://flag.example");
        assert_eq!(args.db_url, DEFAULT_DB_URL);
    }

    #[test]
    fn missing_api_url_is_rejected() {
        assert!(matches!(parse(&[], None), Err(ArgsError::MissingApiUrl)));
        assert!(matches!(parse(&[], Some("  ")), Err(ArgsError::MissingApiUrl)));
    }

    #[test]
    fn flag_without_value_is_rejected() {
        assert!(matches!(
            parse(&["--db"], Some("https://api.example")),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn relative_db_path_becomes_absolute_url() {
        let url = normalize_sqlite_url("sqlite:data/local.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/local.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn help_short_circuits() {
        assert!(matches!(parse(&["--help"], None), Ok(Parsed::Help)));
    }
}
