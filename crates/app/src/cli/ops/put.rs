use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Args;

use crate::cli::op::{Rejected, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Put {
    /// Directory node to store the file in
    pub path: String,

    /// Local file to upload
    pub file: PathBuf,

    /// Name to store the file under (defaults to the local file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Replace an existing file
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
    #[error("cannot read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("no file name given for {0}")]
    NoName(PathBuf),
}

impl Put {
    fn target_name(&self) -> Result<String, PutError> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| PutError::NoName(self.file.clone()))
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Put {
    type Error = PutError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let name = self.target_name()?;
        let input = File::open(&self.file).map_err(|e| PutError::Read(self.file.clone(), e))?;

        let node = session.node(&self.path);
        node.add_file(BufReader::new(input), &name, self.overwrite)
            .map_err(Rejected)?;
        Ok(format!("Stored {}", node.child(&name).path()))
    }
}
