use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dl-cli")]
#[command(about = "Dialogue script runner")]
pub(crate) struct Cli {
    /// Tracing filter for stderr logs; overrides RUST_LOG.
    #[arg(long = "log-level", global = true)]
    pub(crate) log_level: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Run(RunArgs),
    Check(CheckArgs),
    Play(PlayArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "response", allow_hyphen_values = true)]
    pub(crate) responses: Vec<String>,
    #[arg(long = "call-result", allow_hyphen_values = true)]
    pub(crate) call_results: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(
        long = "script",
        conflicts_with = "scripts_dir",
        required_unless_present = "scripts_dir"
    )]
    pub(crate) script: Option<String>,
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
    #[arg(long = "dump")]
    pub(crate) dump: bool,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "line-mode")]
    pub(crate) line_mode: bool,
}
