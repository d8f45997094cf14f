use clap::Args;

use common::prelude::InventoryError;

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Destroy {
    /// Bucket to drop, together with every token in it
    pub bucket: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DestroyError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Destroy {
    type Error = DestroyError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        let inventory = ctx.inventory(&state).await?;
        let dropped = inventory.destroy(&self.bucket).await?;

        Ok(format!(
            "Destroyed bucket: {} ({} tokens dropped)",
            self.bucket,
            dropped.len()
        ))
    }
}
