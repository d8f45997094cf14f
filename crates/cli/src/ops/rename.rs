use clap::Args;

use common::prelude::InventoryError;

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Rename {
    /// Current bucket name
    pub from: String,

    /// New bucket name
    pub to: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Rename {
    type Error = RenameError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        let inventory = ctx.inventory(&state).await?;
        inventory.rename(&self.from, &self.to).await?;

        Ok(format!("Renamed bucket: {} -> {}", self.from, self.to))
    }
}
