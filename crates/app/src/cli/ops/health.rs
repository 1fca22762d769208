use clap::Args;

use common::prelude::{AccessRight, GrantFile};

use crate::cli::op::resolve_login;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    /// Carries the report gathered up to the failing check.
    #[error("{0}\nHealth check failed")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        let state = match ctx.state() {
            Ok(state) => state,
            Err(e) => {
                lines.push(format!("  error: {}", e));
                return Err(HealthError::Failed(lines.join("\n")));
            }
        };
        lines.push(format!("  directory:    {}", state.vault_dir.display()));
        lines.push(format!("  config.toml:  OK ({})", state.config_path.display()));
        lines.push(format!("  log_level:    {}", state.config.log_level));
        let login = resolve_login(ctx.login.clone(), state.config.login.clone());
        lines.push(format!(
            "  login:        {}",
            login.as_deref().unwrap_or("(none)")
        ));

        // 2. Check series root
        let repository = state.config.repository();
        let series_root = repository.series_root();
        lines.push(String::new());
        lines.push(format!("Repository ({}):", series_root.display()));

        if !series_root.is_dir() {
            lines.push("  series root: MISSING".to_string());
            return Err(HealthError::Failed(lines.join("\n")));
        }
        lines.push("  series root: OK".to_string());

        match GrantFile::read(&series_root) {
            Ok(grants) => {
                let admins = grants
                    .grants
                    .keys()
                    .filter(|login| grants.get(login) == AccessRight::ViewFull)
                    .count();
                lines.push(format!("  grant file:  OK ({} VIEW_FULL)", admins));
            }
            Err(e) => lines.push(format!("  grant file:  UNREADABLE ({})", e)),
        }

        // 3. Check what the login sees
        if let Some(login) = login {
            let node = repository.node("", &login);
            lines.push(format!("  access:      {}", node.access()));
            lines.push(format!(
                "  series:      {} visible",
                node.load_child_resources().len()
            ));
        }

        Ok(lines.join("\n"))
    }
}
