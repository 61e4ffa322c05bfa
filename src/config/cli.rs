use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "receipt-split")]
#[command(about = "Split receipt costs between group members and record them on the ledger")]
pub struct CliArgs {
    #[arg(long, default_value = "receipt-split.toml", help = "Settings file")]
    pub config: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the ledger groups of the configured account
    Groups,
    /// List the members of a group
    Members {
        #[arg(long)]
        group_id: String,
    },
    /// Compute the split and print it without recording anything
    Allocate {
        #[arg(long, help = "Transaction request as JSON")]
        request: PathBuf,
        #[arg(long, help = "CSV of member_id,cost rows replacing the request's member_costs")]
        items: Option<PathBuf>,
    },
    /// Compute the split and record it on the ledger
    Submit {
        #[arg(long, help = "Transaction request as JSON")]
        request: PathBuf,
        #[arg(long, help = "CSV of member_id,cost rows replacing the request's member_costs")]
        items: Option<PathBuf>,
    },
}
