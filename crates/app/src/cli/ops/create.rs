use clap::Args;

use crate::cli::op::{Rejected, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Parent path: the series root ("") or a series / contest
    pub path: String,

    /// Id of the new resource
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.node(&self.path);
        node.add_resource(&self.id).map_err(Rejected)?;

        let kind = node
            .successor_kind()
            .map(|kind| kind.to_string())
            .unwrap_or_default();
        Ok(format!("Created {} {}", kind, node.child(&self.id).path()))
    }
}
