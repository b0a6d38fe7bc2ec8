use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Application state coordination layer.
#[derive(Parser, Debug)]
#[command(name = "deskstate", version, about)]
pub struct Cli {
    /// TOML configuration file. Defaults to `<data dir>/config.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// One-shot override of the `use_state_machine` flag for this process.
    #[arg(long, global = true, value_parser = parse_bool_flag)]
    pub state_machine: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the startup probes and print the screen to show as JSON.
    Status,
    /// Sign out and forget the stored session.
    Logout,
    /// Show the resolved state-machine flag, or persist a new value.
    Flag {
        /// Persist this value; takes effect on the next start.
        #[arg(long, value_parser = parse_bool_flag)]
        set: Option<bool>,
    },
}

fn parse_bool_flag(raw: &str) -> Result<bool, String> {
    ds_app::feature_flag::parse_override(raw)
        .ok_or_else(|| format!("expected a boolean (true/false/1/0/on/off), got '{raw}'"))
}
