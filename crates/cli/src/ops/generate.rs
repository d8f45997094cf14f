use clap::Args;

use common::prelude::{parse_expiry, InventoryError};

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Generate {
    /// Bucket to mint tokens into
    pub bucket: String,

    /// How many tokens to mint
    pub count: usize,

    /// Worth stamped on every minted token
    #[arg(long)]
    pub value: Option<String>,

    /// Expiry as RFC 3339, "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD"
    #[arg(long)]
    pub expiry: Option<String>,

    /// Provenance note stamped on every minted token
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("Could not parse expiry: {0}")]
    BadExpiry(String),
}

#[async_trait::async_trait]
impl crate::op::Op for Generate {
    type Error = GenerateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        let expiry = match &self.expiry {
            Some(raw) => {
                Some(parse_expiry(raw).ok_or_else(|| GenerateError::BadExpiry(raw.clone()))?)
            }
            None => None,
        };

        let inventory = ctx.inventory(&state).await?;
        let minted = inventory
            .generate(
                &self.bucket,
                self.count,
                self.value.clone(),
                expiry,
                self.label.clone(),
            )
            .await?;

        let mut lines = vec![format!("Generated {} tokens in {}:", minted.len(), self.bucket)];
        lines.extend(minted.iter().map(|snapshot| format!("  {}", snapshot)));

        Ok(lines.join("\n"))
    }
}
