use clap::Args;

use common::prelude::InventoryError;

#[derive(Args, Debug, Clone)]
pub struct Buckets;

#[derive(Debug, thiserror::Error)]
pub enum BucketsError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Buckets {
    type Error = BucketsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let inventory = ctx.inventory(&state).await?;

        let buckets = inventory.buckets().await;
        if buckets.is_empty() {
            return Ok("No buckets found".to_string());
        }

        let output = buckets
            .iter()
            .map(|(name, kind, stats)| {
                format!(
                    "{} ({}): {} tokens, {} issued, {} expired",
                    name, kind, stats.total, stats.issued, stats.expired
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(output)
    }
}
