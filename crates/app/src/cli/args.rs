pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vault")]
#[command(about = "Browse and edit a problem repository of series, contests and problems")]
pub struct Args {
    /// Path to the vault config directory (defaults to ~/.vault)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Login to act as (defaults to the configured login)
    #[arg(long, global = true)]
    pub login: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
