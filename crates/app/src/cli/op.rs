use std::error::Error;
use std::path::PathBuf;

use common::prelude::{Node, Repository, ValidationReport};

use crate::state::{AppState, StateError};

/// Pick the login to act as.
///
/// Priority: explicit `--login` flag > config file `login`.
pub fn resolve_login(explicit: Option<String>, configured: Option<String>) -> Option<String> {
    explicit.or(configured).filter(|login| !login.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("no login given. Pass --login or set `login` in config.toml")]
    NoLogin,
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.vault)
    pub config_path: Option<PathBuf>,
    /// Login from the command line, if any
    pub login: Option<String>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>, login: Option<String>) -> Self {
        Self { config_path, login }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Load the config and settle on a login for repository operations.
    pub fn session(&self) -> Result<Session, SessionError> {
        let state = self.state()?;
        let login = resolve_login(self.login.clone(), state.config.login.clone())
            .ok_or(SessionError::NoLogin)?;
        Ok(Session {
            repository: state.config.repository(),
            login,
        })
    }
}

/// A configured repository and the login acting on it.
#[derive(Debug, Clone)]
pub struct Session {
    pub repository: Repository,
    pub login: String,
}

impl Session {
    pub fn node(&self, path: &str) -> Node {
        let node = self.repository.node(path, &self.login);
        tracing::debug!(
            path = %node.path(),
            node_type = %node.node_type(),
            access = %node.access(),
            "resolved node"
        );
        node
    }
}

/// Renders a rejected operation as `key: message` lines.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Rejected(pub ValidationReport);

impl From<ValidationReport> for Rejected {
    fn from(report: ValidationReport) -> Self {
        Self(report)
    }
}

/// One `vault` subcommand.
///
/// Repository ops open a [`Session`] from the context and act on a [`Node`];
/// a refused mutation comes back as [`Rejected`]. `Output` is printed to
/// stdout as is.
#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Builds the `vault` command table from `(Variant, OpType)` pairs.
///
/// Generates `Command` (the clap subcommand enum), `OpOutput` and `OpError`
/// (one variant per op, displayed transparently) and an [`Op`] impl on
/// `Command` that logs the chosen subcommand and dispatches to it.
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            tracing::debug!(command = stringify!($variant), "running command");
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
