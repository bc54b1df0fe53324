//! Clap derive structures for the `zonewright` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zonewright -- BIND zone and DKIM generator for hosted domains
#[derive(Debug, Parser)]
#[command(
    name = "zonewright",
    version,
    about = "Regenerate BIND zones, name server configuration and DKIM keys for hosted domains",
    long_about = "Reads the hosted domains from the domain store and rewrites every\n\
        zone file, the master name server configuration and the DKIM signing\n\
        lists. Intended to run once per change, serialized by the caller.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "ZONEWRIGHT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZONEWRIGHT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite zone files and the master configuration, then reload BIND
    #[command(alias = "z")]
    Zones(RunArgs),

    /// Provision missing DKIM keys and rewrite the signing milter's lists
    Dkim,

    /// Run `zones` followed by `dkim`
    All(RunArgs),

    /// Show what `zones` would do without writing anything
    #[command(alias = "dry-run")]
    Plan(RunArgs),

    /// Inspect settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Run Arguments ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Date used for zone serials (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
}

impl RunArgs {
    pub fn today(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved settings (defaults, file and environment merged)
    Show,

    /// Print the settings file path in use
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn date_flag_parses_iso_dates() {
        let cli = Cli::try_parse_from(["zonewright", "zones", "--date", "2024-01-01"]).unwrap();
        let Command::Zones(args) = cli.command else {
            panic!("expected zones");
        };
        assert_eq!(args.today(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
