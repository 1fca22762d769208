use clap::Args;

use common::prelude::AccessRight;

use crate::cli::op::{Rejected, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Grant {
    /// The series root ("") or a resource
    pub path: String,

    /// Login receiving the right
    pub login: String,

    /// NONE, LIST, VIEW or VIEW_FULL; NONE removes the grant
    pub right: AccessRight,
}

#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Grant {
    type Error = GrantError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let node = session.node(&self.path);
        node.set_grant(&self.login, self.right).map_err(Rejected)?;

        if self.right == AccessRight::None {
            Ok(format!("Removed grant for {} on /{}", self.login, node.path()))
        } else {
            Ok(format!(
                "Granted {} to {} on /{}",
                self.right,
                self.login,
                node.path()
            ))
        }
    }
}
