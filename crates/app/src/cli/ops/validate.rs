use std::path::PathBuf;

use clap::Args;

use common::prelude::{Repository, ResourceKind};

use crate::cli::op::Rejected;

#[derive(Args, Debug, Clone)]
pub struct Validate {
    /// Resource directory to check
    pub dir: PathBuf,

    /// Kind of resource stored in the directory
    #[arg(long, short)]
    pub kind: ResourceKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error(transparent)]
    Rejected(#[from] Rejected),
}

/// Checks a resource directory without consulting config or grants.
#[async_trait::async_trait]
impl crate::cli::op::Op for Validate {
    type Error = ValidateError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        Repository::validate(&self.dir, self.kind)
            .into_result()
            .map_err(Rejected)?;
        Ok(format!("{} {} is valid", self.kind, self.dir.display()))
    }
}
