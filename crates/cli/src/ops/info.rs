use clap::Args;

use common::prelude::InventoryError;

#[derive(Args, Debug, Clone)]
pub struct Info {
    /// Bucket to describe
    pub bucket: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InfoError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Info {
    type Error = InfoError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let inventory = ctx.inventory(&state).await?;

        let kind = inventory.kind(&self.bucket).await?;
        let stats = inventory.stats(&self.bucket).await?;

        Ok(format!(
            "{} ({}): {} tokens, {} issued, {} expired",
            self.bucket, kind, stats.total, stats.issued, stats.expired
        ))
    }
}
