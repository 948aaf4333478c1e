//! CLI argument definitions for poolscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pools` | Latest snapshot per pool, largest TVL first |
//! | `search` | Pools whose name contains a query, best APR first |
//! | `history` | APR/TVL history, stats and chart series for one pool |
//! | `protocols` | Per-protocol APR comparison |
//! | `sources` | Data source configuration and health |
//! | `theme` | Show or change the stored light/dark preference |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use generated offline data |
//! | `--timeout-ms` | `10000` | Request timeout in ms |

use clap::{Args, Parser, Subcommand, ValueEnum};
use poolscope_core::{parse_date, ThemePreference, TimeRange};
use time::Date;

/// Liquidity pool APR and TVL analytics.
#[derive(Debug, Parser)]
#[command(
    name = "poolscope",
    author,
    version,
    about = "Liquidity pool APR and TVL analytics",
    long_about = "poolscope reads pool snapshots from a hosted PostgREST table and reports \
the latest state of every pool, per-pool history with summary statistics, and \
per-protocol APR trends.\n\
\n\
Credentials are read from POOLSCOPE_SUPABASE_URL and POOLSCOPE_SUPABASE_ANON_KEY \
(or SUPABASE_* / VITE_SUPABASE_*), including from a .env file."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve generated fixture data instead of querying the data source.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the latest snapshot of every pool.
    ///
    ///   poolscope pools --limit 10 --format table
    Pools(PoolsArgs),

    /// Find pools by name.
    ///
    ///   poolscope search weth
    Search(SearchArgs),

    /// Show history for one pool.
    ///
    ///   poolscope history vAMM-WETH/USDC --range 30d
    ///   poolscope history vAMM-WETH/USDC --start 2024-05-01 --end 2024-05-07
    History(HistoryArgs),

    /// Compare APR across protocols.
    ///
    ///   poolscope protocols --protocol aerodrome --protocol velodrome
    Protocols(ProtocolsArgs),

    /// Show data source configuration and health.
    Sources,

    /// Show or change the light/dark preference.
    Theme(ThemeArgs),
}

#[derive(Debug, Args)]
pub struct PoolsArgs {
    /// Maximum number of pools to return.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive substring of the pool name.
    pub query: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Pool name, exactly as listed by `pools`.
    pub pool: String,

    /// Lookback preset: 24h, 7d, 30d, 90d, 180d or custom.
    #[arg(long, default_value = "7d")]
    pub range: TimeRange,

    /// First day (YYYY-MM-DD) of a custom range. Implies `--range custom`.
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<Date>,

    /// Last day (YYYY-MM-DD) of a custom range. Implies `--range custom`.
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<Date>,
}

#[derive(Debug, Args)]
pub struct ProtocolsArgs {
    /// Protocols to include; repeat for several. All when omitted.
    #[arg(long = "protocol")]
    pub protocols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: Option<ThemeCommand>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ThemeCommand {
    /// Print the stored preference (default).
    Show,
    /// Switch between light and dark.
    Toggle,
    /// Store a specific preference.
    Set {
        /// light or dark
        theme: ThemePreference,
    },
}

fn parse_date_arg(value: &str) -> Result<Date, String> {
    parse_date(value).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_history_with_custom_dates() {
        let cli = Cli::try_parse_from([
            "poolscope",
            "--format",
            "table",
            "history",
            "WETH/USDC",
            "--start",
            "2024-05-01",
        ])
        .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Table);
        let Command::History(args) = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(args.range, TimeRange::Last7Days);
        assert!(args.start.is_some());
        assert!(args.end.is_none());
    }

    #[test]
    fn rejects_unknown_range() {
        assert!(Cli::try_parse_from(["poolscope", "history", "X", "--range", "2w"]).is_err());
    }

    #[test]
    fn theme_subcommand_is_optional() {
        let cli = Cli::try_parse_from(["poolscope", "theme"]).expect("valid");
        assert!(matches!(cli.command, Command::Theme(ThemeArgs { command: None })));

        let cli = Cli::try_parse_from(["poolscope", "theme", "set", "dark"]).expect("valid");
        assert!(matches!(
            cli.command,
            Command::Theme(ThemeArgs {
                command: Some(ThemeCommand::Set {
                    theme: ThemePreference::Dark
                })
            })
        ));
    }
}
