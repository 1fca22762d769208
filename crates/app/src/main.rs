// CLI modules
mod cli;
mod logging;
mod state;

use clap::{Parser, Subcommand};
use cli::{
    args::Args, op::Op, Create, Download, Grant, Health, Import, Init, Ls, Mkdir, Put, Rm, Update,
    Validate, Version,
};

command_enum! {
    (Init, Init),
    (Version, Version),
    (Health, Health),
    (Ls, Ls),
    (Create, Create),
    (Mkdir, Mkdir),
    (Put, Put),
    (Import, Import),
    (Rm, Rm),
    (Download, Download),
    (Update, Update),
    (Grant, Grant),
    (Validate, Validate),
}

/// Used until a config directory exists to say otherwise.
const FALLBACK_LOG_LEVEL: &str = "warn";

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logging settings come from config when there is one
    let (log_level, log_dir) = match state::AppState::load(args.config_path.clone()) {
        Ok(state) => (state.config.log_level, state.config.log_dir),
        Err(_) => (FALLBACK_LOG_LEVEL.to_string(), None),
    };
    let guards = logging::init_logging(&log_level, log_dir.as_deref());

    let ctx = cli::op::OpContext::new(args.config_path, args.login);
    let result = args.command.execute(&ctx).await;

    // Flush the non-blocking writers before exiting
    drop(guards);

    match result {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
