use std::{env, fmt, iter::Peekable, path::Path, str::FromStr};

use log::LevelFilter;

use crate::{Error, Result};

const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Runtime options for the round-trip search.
#[derive(Clone, Debug)]
pub struct SolverOptions {
    /// Worker count; 0 derives one from available parallelism.
    pub workers: usize,
    /// Index of the start/end waypoint in input order.
    pub base_index: usize,
    /// Evaluated candidates between progress notifications; 0 disables them.
    pub progress_interval: u64,
    /// Structured logging level.
    pub log_level: LogLevel,
    /// Logging output format.
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    pub log_timestamp: bool,
    /// Optional output file path for logs and metrics. Empty means stderr.
    pub log_output: String,
    /// Optional input file path for waypoints. Empty means stdin.
    pub input: String,
    /// Optional output file path for the ordered route. Empty means stdout.
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "off" => Ok(Self::Off),
            _ => Err(Error::invalid_input(format!(
                "Invalid value for --log-level: {value}"
            ))),
        }
    }

    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::invalid_input(format!(
                "Invalid value for --log-format: {value}"
            ))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            base_index: 0,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = split_arg(raw_name, &mut args);

            match name.as_str() {
                "workers" => options.workers = parse_value(&name, value)?,
                "base-index" => options.base_index = parse_value(&name, value)?,
                "progress-interval" => options.progress_interval = parse_value(&name, value)?,
                "log-level" => options.log_level = LogLevel::parse(&require_value(&name, value)?)?,
                "log-format" => {
                    options.log_format = LogFormat::parse(&require_value(&name, value)?)?;
                }
                "log-timestamp" => {
                    options.log_timestamp = match value {
                        Some(v) => parse_bool(&name, &v)?,
                        None => true,
                    };
                }
                "no-log-timestamp" => {
                    if value.is_some() {
                        return Err(Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    options.log_timestamp = false;
                }
                "log-output" => options.log_output = require_value(&name, value)?,
                "input" => options.input = require_value(&name, value)?,
                "output" => options.output = require_value(&name, value)?,
                _ => {
                    return Err(Error::invalid_input(format!(
                        "Unknown option: --{name}\n\n{}",
                        Self::usage()
                    )));
                }
            }
        }

        Ok(options)
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  roundtrip-mt [options] [--input waypoints.csv]\n",
            "  roundtrip-mt [options] < waypoints.csv\n\n",
            "Options:\n",
            "  --workers <usize>            0 = derive from available cores\n",
            "  --base-index <usize>         start/end waypoint, default 0\n",
            "  --progress-interval <u64>    0 = no progress logging\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --input <path>\n",
            "  --output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  roundtrip-mt --input waypoints.csv --log-level info\n",
            "  roundtrip-mt --workers 8 --output route.txt < waypoints.csv\n",
            "  roundtrip-mt --log-level=debug --log-format=pretty < waypoints.csv\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        path_or_default(&self.log_output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        path_or_default(&self.input)
    }

    pub fn output_path(&self) -> Option<&Path> {
        path_or_default(&self.output)
    }
}

impl fmt::Display for SolverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "workers={} base_index={} progress_interval={} log_level={} log_format={} \
             log_timestamp={} log_output={} input={} output={}",
            self.workers,
            self.base_index,
            self.progress_interval,
            self.log_level,
            self.log_format,
            self.log_timestamp,
            or_dash(&self.log_output),
            or_dash(&self.input),
            or_dash(&self.output),
        )
    }
}

fn path_or_default(value: &str) -> Option<&Path> {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        None
    } else {
        Some(Path::new(value))
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn split_arg<I>(raw_name: &str, args: &mut Peekable<I>) -> (String, Option<String>)
where
    I: Iterator<Item = String>,
{
    if let Some((name, value)) = raw_name.split_once('=') {
        return (name.to_owned(), Some(value.to_owned()));
    }
    let value = match args.peek() {
        Some(next) if !next.starts_with("--") => args.next(),
        _ => None,
    };
    (raw_name.to_owned(), value)
}

fn require_value(name: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| Error::invalid_input(format!("Missing value for --{name}")))
}

fn parse_value<T: FromStr>(name: &str, value: Option<String>) -> Result<T> {
    let value = require_value(name, value)?;
    value
        .parse()
        .map_err(|_| Error::invalid_input(format!("Invalid value for --{name}: {value}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "off" | "OFF" => Ok(false),
        _ => Err(Error::invalid_input(format!(
            "Invalid boolean for --{name}: {value} (expected true/false)"
        ))),
    }
}
