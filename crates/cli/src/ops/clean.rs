use clap::Args;

use common::prelude::InventoryError;

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Clean {
    /// Bucket to clean
    pub bucket: String,

    /// Drop expired tokens
    #[arg(long)]
    pub expired: bool,

    /// Drop issued tokens
    #[arg(long)]
    pub issued: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("Nothing to clean: pass --expired and/or --issued")]
    NothingRequested,
}

#[async_trait::async_trait]
impl crate::op::Op for Clean {
    type Error = CleanError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        if !self.expired && !self.issued {
            return Err(CleanError::NothingRequested);
        }

        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        let inventory = ctx.inventory(&state).await?;

        let mut dropped_expired = 0;
        let mut dropped_issued = 0;
        if self.expired {
            dropped_expired = inventory.clean_expired(&self.bucket).await?;
        }
        if self.issued {
            dropped_issued = inventory.clean_issued(&self.bucket).await?;
        }

        Ok(format!(
            "Removed {} expired and {} issued tokens from {}",
            dropped_expired, dropped_issued, self.bucket
        ))
    }
}
