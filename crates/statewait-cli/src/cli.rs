//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "statewait")]
#[command(about = "Wait for a command's reported state to settle")]
#[command(after_help = "Exit codes: 0 success, 1 failed, 2 timed out, 130 cancelled, 64 usage error")]
pub struct Args {
    /// JSON file with wait settings (flags override it)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Label used in logs and messages
    #[arg(long)]
    pub name: Option<String>,

    /// States meaning "still in progress" (repeatable or comma separated)
    #[arg(long, value_delimiter = ',')]
    pub pending: Vec<String>,

    /// States meaning "done" (repeatable or comma separated)
    #[arg(long, value_delimiter = ',')]
    pub target: Vec<String>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Probe every N seconds instead of backing off exponentially
    #[arg(long)]
    pub interval: Option<u64>,

    /// Minimum seconds between probes
    #[arg(long)]
    pub min_interval: Option<u64>,

    /// Maximum seconds between probes
    #[arg(long)]
    pub max_interval: Option<u64>,

    /// Seconds to wait before the first probe
    #[arg(long)]
    pub delay: Option<u64>,

    /// Consecutive target observations required
    #[arg(long)]
    pub occurrences: Option<u32>,

    /// Consecutive "not found" probes tolerated while waiting for a target
    #[arg(long)]
    pub not_found_checks: Option<u32>,

    /// Exit code of the command that means "resource not found"
    #[arg(long)]
    pub not_found_exit_code: Option<i32>,

    /// Kill a single probe after this many seconds
    #[arg(long)]
    pub probe_timeout: Option<u64>,

    /// Wait for the resource to disappear (absence is success)
    #[arg(long)]
    pub gone: bool,

    /// Print a JSON report on stdout
    #[arg(long)]
    pub json: bool,

    /// Probe command; its last non-empty stdout line is the state
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}
