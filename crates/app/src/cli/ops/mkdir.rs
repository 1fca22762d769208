use clap::Args;

use crate::cli::op::{Rejected, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Attachment directory to create the directory in
    pub path: String,

    /// Name of the new directory
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.node(&self.path);
        node.add_directory(&self.name).map_err(Rejected)?;
        Ok(format!("Created directory {}", node.child(&self.name).path()))
    }
}
