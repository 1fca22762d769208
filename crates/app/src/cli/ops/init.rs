use std::path::PathBuf;

use clap::Args;

use common::prelude::{Repository, RepositoryError, DEFAULT_SERIES_DIRNAME};

use crate::state::{AppConfig, AppState, StateError, DEFAULT_LOG_LEVEL};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Directory that holds (or will hold) the series root
    #[arg(long)]
    pub repo_root: PathBuf,

    /// Name of the series root below the repo root
    #[arg(long, default_value = DEFAULT_SERIES_DIRNAME)]
    pub series_dirname: String,

    /// Login granted VIEW_FULL on the series root
    #[arg(long)]
    pub admin: Option<String>,

    /// Default login for later commands (defaults to --admin)
    #[arg(long = "default-login")]
    pub default_login: Option<String>,

    /// Default log level
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Write daily rolling log files to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let repo_root = if self.repo_root.is_absolute() {
            self.repo_root.clone()
        } else {
            std::env::current_dir()?.join(&self.repo_root)
        };

        // Initialize the repository first so a failed init leaves no config behind
        let repository = Repository::new(&repo_root, &self.series_dirname);
        repository.init(self.admin.as_deref())?;

        let config = AppConfig {
            repo_root,
            series_dirname: self.series_dirname.clone(),
            login: self.default_login.clone().or_else(|| self.admin.clone()),
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        };
        let state = AppState::init(ctx.config_path.clone(), config)?;

        let mut output = format!(
            "Initialized vault config at {}\n  series root: {}",
            state.vault_dir.display(),
            repository.series_root().display()
        );
        if let Some(admin) = &self.admin {
            output.push_str(&format!("\n  admin:       {}", admin));
        }
        Ok(output)
    }
}
