use std::path::PathBuf;

use clap::Args;

use crate::cli::op::{Rejected, SessionError};

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Resource, file or directory to download
    pub path: String,

    /// Where to write the download (defaults to its file name in the working directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
    #[error("cannot write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let download = session.node(&self.path).download().map_err(Rejected)?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&download.filename));
        tokio::fs::write(&output, &download.bytes)
            .await
            .map_err(|e| DownloadError::Write(output.clone(), e))?;

        Ok(format!(
            "Wrote {} ({} bytes)",
            output.display(),
            download.bytes.len()
        ))
    }
}
