use std::collections::BTreeMap;

use clap::Args;

use crate::cli::op::{Rejected, SessionError};

/// Parse a `key=value` pair; the value may be empty or contain `=`.
fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{}`", raw)),
    }
}

#[derive(Args, Debug, Clone)]
pub struct Update {
    /// Resource to update
    pub path: String,

    /// New field value, as key=value (repeatable)
    #[arg(long = "set", value_parser = parse_pair, required = true)]
    pub set: Vec<(String, String)>,

    /// Value the field is expected to hold now, as key=value (repeatable).
    /// The update is refused if the stored value differs.
    #[arg(long = "expect", value_parser = parse_pair)]
    pub expect: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Rejected(#[from] Rejected),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Update {
    type Error = UpdateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let old_values = self.expect.iter().cloned().collect::<BTreeMap<_, _>>();
        let new_values = self.set.iter().cloned().collect::<BTreeMap<_, _>>();

        let mut node = session.node(&self.path);
        node.update_resource(&old_values, &new_values)
            .map_err(Rejected)?;

        let fields = new_values.keys().cloned().collect::<Vec<_>>().join(", ");
        Ok(format!("Updated /{}: {}", node.path(), fields))
    }
}
