use std::path::PathBuf;

use chrono::TimeDelta;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use machctl_core::{IssueType, Severity};

#[derive(Debug, Parser)]
#[command(
    name = machctl_core::TOOL_NAME,
    version,
    about = "Diagnose bare-metal machine inventory"
)]
pub struct Args {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a machine inventory and report issues per machine
    Issues(IssuesArgs),

    /// List every known issue type
    Types(OutputArgs),
}

#[derive(Debug, ClapArgs)]
pub struct IssuesArgs {
    /// Inventory file (JSON or YAML list of machines); `-` or absent reads stdin
    pub inventory: Option<PathBuf>,

    /// Minimum severity to report
    #[arg(long, env = "MACHCTL_SEVERITY", default_value = "minor")]
    pub severity: Severity,

    /// Only evaluate these issue types
    #[arg(long, env = "MACHCTL_ONLY", value_delimiter = ',')]
    pub only: Vec<IssueType>,

    /// Never evaluate these issue types (wins over --only)
    #[arg(long, env = "MACHCTL_OMIT", value_delimiter = ',')]
    pub omit: Vec<IssueType>,

    /// Report provisioning errors younger than this (e.g. 7d, 12h, 1h30m); 0 disables
    #[arg(
        long,
        env = "MACHCTL_LAST_ERROR_THRESHOLD",
        default_value = "7d",
        value_parser = parse_threshold
    )]
    pub last_error_threshold: TimeDelta,

    /// Exit with code 1 when any issue is found
    #[arg(long)]
    pub fail: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, ClapArgs)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Parses durations such as `7d`, `36h`, `1h30m`, `90s` or a bare `0`.
pub fn parse_threshold(raw: &str) -> Result<TimeDelta, String> {
    let raw = raw.trim();
    if raw == "0" {
        return Ok(TimeDelta::zero());
    }
    if raw.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = TimeDelta::zero();
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let amount: i64 = digits
            .parse()
            .map_err(|_| format!("invalid duration '{raw}': expected a number before '{c}'"))?;
        digits.clear();
        let part = match c {
            'd' => TimeDelta::try_days(amount),
            'h' => TimeDelta::try_hours(amount),
            'm' => TimeDelta::try_minutes(amount),
            's' => TimeDelta::try_seconds(amount),
            other => return Err(format!("invalid duration '{raw}': unknown unit '{other}'")),
        };
        total = part
            .and_then(|part| total.checked_add(&part))
            .ok_or_else(|| format!("duration '{raw}' out of range"))?;
    }
    if !digits.is_empty() {
        return Err(format!("invalid duration '{raw}': missing unit after {digits}"));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_threshold("7d"), Ok(TimeDelta::days(7)));
        assert_eq!(parse_threshold("36h"), Ok(TimeDelta::hours(36)));
        assert_eq!(parse_threshold("90s"), Ok(TimeDelta::seconds(90)));
        assert_eq!(parse_threshold("0"), Ok(TimeDelta::zero()));
    }

    #[test]
    fn parses_compound_durations() {
        assert_eq!(
            parse_threshold("1h30m"),
            Ok(TimeDelta::hours(1) + TimeDelta::minutes(30))
        );
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_threshold("").is_err());
        assert!(parse_threshold("10").is_err());
        assert!(parse_threshold("h").is_err());
        assert!(parse_threshold("3w").is_err());
    }

    #[test]
    fn rejects_durations_that_overflow() {
        assert!(parse_threshold("100000000000d").is_ok());
        assert_eq!(
            parse_threshold("100000000000d100000000000d"),
            Err("duration '100000000000d100000000000d' out of range".to_string())
        );
        assert!(parse_threshold("99999999999999999999s").is_err());
    }

    #[test]
    fn parses_issue_filters() {
        let args = Args::try_parse_from([
            "machctl",
            "issues",
            "inv.json",
            "--only",
            "crashloop,no-partition",
            "--omit",
            "bmc-no-distinct-ip",
            "--severity",
            "major",
        ])
        .unwrap();
        let Command::Issues(issues) = args.command else {
            panic!("expected issues subcommand");
        };
        assert_eq!(issues.only, vec![IssueType::CrashLoop, IssueType::NoPartition]);
        assert_eq!(issues.omit, vec![IssueType::BmcNoDistinctIp]);
        assert_eq!(issues.severity, Severity::Major);
        assert_eq!(issues.last_error_threshold, TimeDelta::days(7));
    }

    #[test]
    fn unknown_issue_type_is_rejected() {
        let err = Args::try_parse_from(["machctl", "issues", "--only", "disk-full"]).unwrap_err();
        assert!(err.to_string().contains("unknown issue type: disk-full"));
    }
}
