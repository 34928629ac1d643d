// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `zonewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "zonewatch",
    version,
    about = "Run named, rebuilding zone artifacts and reloading it whenever the zone repository changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to watch for zone file changes.
    #[arg(long, value_name = "PATH", default_value = "/etc/bind/git")]
    pub path: PathBuf,

    /// Path to run make in (usually a symlink below --path).
    #[arg(long, value_name = "PATH", default_value = "/etc/bind/git/masterzones")]
    pub make_path: PathBuf,

    /// Full path of the named configuration file to generate.
    #[arg(long, value_name = "PATH", default_value = "/etc/bind/named.conf")]
    pub bind_config: PathBuf,

    /// User named switches to once it has started.
    #[arg(long, value_name = "USER", default_value = "named")]
    pub bind_user: String,

    /// Path of the named configuration template.
    #[arg(long, value_name = "PATH", default_value = "/etc/bind/named.conf.tmpl")]
    pub config_template: PathBuf,

    /// Zone description file (TOML) fed to the template.
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Maximum time to wait for --make-path to appear (e.g. "500ms", "30s", "5m").
    #[arg(long, value_name = "DURATION", default_value = "5m", value_parser = parse_duration)]
    pub initial_wait: Duration,

    /// Port named listens on.
    #[arg(long, default_value_t = 5353)]
    pub port: u16,

    /// The name server binary to supervise.
    #[arg(long, value_name = "PATH", default_value = "/usr/sbin/named")]
    pub named_binary: PathBuf,

    /// The make binary used to regenerate zone artifacts.
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/make")]
    pub make_binary: PathBuf,

    /// Watch --path recursively instead of only its top level.
    #[arg(long)]
    pub recursive: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ZONEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Render the named configuration to stdout, but don't start anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Parse a duration like `"500ms"`, `"30s"`, `"5m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
