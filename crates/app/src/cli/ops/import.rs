use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Args;

use crate::cli::op::{Rejected, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Import {
    /// Container to import into: the series root ("") or a series / contest
    pub path: String,

    /// Zip archive holding one resource directory
    pub zip: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
    #[error("cannot read {0}: {1}")]
    Read(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Import {
    type Error = ImportError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let input = File::open(&self.zip).map_err(|e| ImportError::Read(self.zip.clone(), e))?;

        let node = session.node(&self.path);
        node.add_zip(BufReader::new(input)).map_err(Rejected)?;
        Ok(format!("Imported {} into /{}", self.zip.display(), node.path()))
    }
}
