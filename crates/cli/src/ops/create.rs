use clap::Args;

use common::prelude::{BucketKind, InventoryError};

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Name for the new bucket
    pub bucket: String,

    /// Bucket kind: generic, mullvad-codes or mullvad-accounts
    #[arg(long, default_value = "generic")]
    pub kind: BucketKind,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        let inventory = ctx.inventory(&state).await?;
        inventory.create(&self.bucket, self.kind).await?;

        Ok(format!("Created {} bucket: {}", self.kind, self.bucket))
    }
}
