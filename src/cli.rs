//! Command-line interface for uplink-dedupe.
//!
//! Uses lexopt for minimal binary size overhead (~34KB).

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Dedupe window in milliseconds.
    pub dedupe_ms: Option<u64>,
    /// Collection window in milliseconds.
    pub collect_ms: Option<u64>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Print one JSON object per report instead of plain text.
    pub json: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('d') | Long("dedupe-ms") => {
                let value: String = parser.value()?.parse()?;
                result.dedupe_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("dedupe-ms", value))?,
                );
            }
            Short('w') | Long("collect-ms") => {
                let value: String = parser.value()?.parse()?;
                result.collect_ms = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("collect-ms", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("json") => {
                result.json = true;
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"uplink-dedupe {version}
Group lines from stdin into per-key dedupe and collection windows

USAGE:
    uplink-dedupe [OPTIONS]

Each input line is a message whose key is the line itself. For every key,
a snapshot is reported when the dedupe window closes and the full batch
when the collection window closes. Both windows start at the key's first
message.

OPTIONS:
    -d, --dedupe-ms <MS>    Dedupe window in milliseconds [default: 200]
    -w, --collect-ms <MS>   Collection window in milliseconds [default: 5000]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --json              Print reports as JSON lines
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    UPLINK_DEDUPE_WINDOW_MS   Dedupe window (overrides config)
    UPLINK_COLLECT_WINDOW_MS  Collection window (overrides config)
    UPLINK_DEDUPE_LOG_LEVEL   Log level (overrides config)
    RUST_LOG                  Alternative log level setting

EXAMPLES:
    # Interactive, 2s dedupe and 5s collection
    uplink-dedupe -d 2000 -w 5000

    # Pipe a file and emit JSON reports
    uplink-dedupe --json < uplinks.txt
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("uplink-dedupe {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
