//! CLI argument definitions for tabprep.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tabprep_model::{
    AsOfDirection, AsOfSpec, DEFAULT_SUFFIX, JoinMapping, JoinMode, MatchPolicy, MergeSpec,
};

#[derive(Parser)]
#[command(
    name = "tabprep",
    version,
    about = "Merge CSV tables vertically, by key, or by nearest timestamp",
    long_about = "Merge CSV tables.\n\n\
                  Vertical merges append tables sharing one header set. Horizontal\n\
                  merges join on key columns (inner, left, right, full) or row by\n\
                  row. As-of merges attach the right row nearest in time."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge two or more CSV files vertically or horizontally.
    Merge(MergeArgs),

    /// Join each left row to the right row nearest in time.
    MergeAsof(AsOfArgs),

    /// Run a merge described by a TOML job file.
    Run(RunArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Input CSV files, in merge order.
    #[arg(short = 'i', long = "input", value_name = "FILE", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output CSV file.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Merge direction.
    #[arg(long = "type", value_enum, default_value = "vertical")]
    pub merge_type: MergeTypeArg,

    /// Join type for horizontal merges with keys.
    #[arg(long = "join-type", value_enum, default_value = "inner")]
    pub join_type: JoinTypeArg,

    /// Key mapping: `key`, `left:right` or `left:right:output`. Repeat for
    /// composite keys. Horizontal merges without keys pair rows by position.
    #[arg(long = "key", value_name = "MAPPING")]
    pub keys: Vec<JoinMapping>,

    /// Suffix appended to colliding right-hand column names.
    #[arg(long = "suffix", default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Accept a merge that produces no rows.
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,

    /// Write a JSON merge report to this path.
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl MergeArgs {
    pub fn spec(&self) -> MergeSpec {
        let spec = match self.merge_type {
            MergeTypeArg::Vertical => MergeSpec::vertical(),
            MergeTypeArg::Horizontal => {
                MergeSpec::horizontal(self.join_type.into(), self.keys.clone())
            }
        };
        spec.with_suffix(self.suffix.clone())
            .with_allow_empty_result(self.allow_empty)
    }
}

#[derive(Args)]
pub struct AsOfArgs {
    /// Left CSV file; every row of it appears in the output.
    #[arg(long = "left", value_name = "FILE")]
    pub left: PathBuf,

    /// Right CSV file searched for time matches.
    #[arg(long = "right", value_name = "FILE")]
    pub right: PathBuf,

    /// Output CSV file.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Timestamp column of the left table (name or 0-based index).
    #[arg(long = "left-time", value_name = "COLUMN")]
    pub left_time: String,

    /// Timestamp column of the right table (defaults to --left-time).
    #[arg(long = "right-time", value_name = "COLUMN")]
    pub right_time: Option<String>,

    /// Which side of the left timestamp to search.
    #[arg(long = "direction", value_enum, default_value = "backward")]
    pub direction: DirectionArg,

    /// Maximum distance in seconds between matched timestamps.
    #[arg(long = "tolerance", value_name = "SECONDS")]
    pub tolerance: Option<f64>,

    /// Exact-match column mapping applied before the time search.
    #[arg(long = "by", value_name = "MAPPING")]
    pub by: Vec<JoinMapping>,

    /// Emit every qualifying right row instead of the best one.
    #[arg(long = "all-matches")]
    pub all_matches: bool,

    /// Require matches to differ in time from the left row.
    #[arg(long = "no-exact-matches")]
    pub no_exact_matches: bool,

    /// Suffix appended to colliding right-hand column names.
    #[arg(long = "suffix", default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Write a JSON merge report to this path.
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl AsOfArgs {
    pub fn spec(&self) -> AsOfSpec {
        let right_time = self.right_time.as_deref().unwrap_or(&self.left_time);
        let mut spec = AsOfSpec::new(self.left_time.as_str(), right_time)
            .with_direction(self.direction.into())
            .with_by(self.by.clone())
            .with_allow_exact_matches(!self.no_exact_matches)
            .with_suffix(self.suffix.clone());
        if let Some(seconds) = self.tolerance {
            spec = spec.with_tolerance_seconds(seconds);
        }
        if self.all_matches {
            spec = spec.with_matches(MatchPolicy::All);
        }
        spec
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML job file; relative paths in it resolve against its directory.
    #[arg(value_name = "JOB")]
    pub job: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MergeTypeArg {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum JoinTypeArg {
    Inner,
    Left,
    Right,
    Full,
}

impl From<JoinTypeArg> for JoinMode {
    fn from(arg: JoinTypeArg) -> Self {
        match arg {
            JoinTypeArg::Inner => Self::Inner,
            JoinTypeArg::Left => Self::Left,
            JoinTypeArg::Right => Self::Right,
            JoinTypeArg::Full => Self::Full,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Backward,
    Forward,
    Nearest,
}

impl From<DirectionArg> for AsOfDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Backward => Self::Backward,
            DirectionArg::Forward => Self::Forward,
            DirectionArg::Nearest => Self::Nearest,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tabprep_model::{ColumnRef, MergeMode};

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_merge_flags_build_spec() {
        let cli = parse(&[
            "tabprep", "merge", "-i", "a.csv", "-i", "b.csv", "-o", "out.csv", "--type",
            "horizontal", "--join-type", "full", "--key", "id:uid:key", "--key", "site",
        ]);
        let Command::Merge(args) = cli.command else {
            panic!("expected merge command");
        };
        assert_eq!(args.inputs.len(), 2);

        let spec = args.spec();
        assert_eq!(spec.mode, MergeMode::Horizontal);
        assert_eq!(spec.join, JoinMode::Full);
        assert_eq!(
            spec.keys,
            vec![
                JoinMapping::new("id", "uid").with_output("key"),
                JoinMapping::same("site"),
            ]
        );
        assert_eq!(spec.suffix, DEFAULT_SUFFIX);
    }

    #[test]
    fn test_bad_key_mapping_is_rejected() {
        let result = Cli::try_parse_from([
            "tabprep", "merge", "-i", "a.csv", "-o", "out.csv", "--key", "id::x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_asof_flags_build_spec() {
        let cli = parse(&[
            "tabprep",
            "merge-asof",
            "--left",
            "trades.csv",
            "--right",
            "quotes.csv",
            "-o",
            "out.csv",
            "--left-time",
            "ts",
            "--direction",
            "nearest",
            "--tolerance",
            "1.5",
            "--by",
            "sym:symbol",
            "--all-matches",
        ]);
        let Command::MergeAsof(args) = cli.command else {
            panic!("expected merge-asof command");
        };
        let spec = args.spec();
        assert_eq!(spec.left_time, ColumnRef::name("ts"));
        assert_eq!(spec.right_time, ColumnRef::name("ts"));
        assert_eq!(spec.direction, AsOfDirection::Nearest);
        assert_eq!(spec.tolerance_seconds, Some(1.5));
        assert_eq!(spec.matches, MatchPolicy::All);
        assert!(spec.allow_exact_matches);
        assert_eq!(spec.by, vec![JoinMapping::new("sym", "symbol")]);
    }
}
