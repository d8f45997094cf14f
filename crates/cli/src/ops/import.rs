use std::fs::File;
use std::path::PathBuf;

use clap::Args;

use common::prelude::InventoryError;

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Import {
    /// Bucket to import into
    pub bucket: String,

    /// Path to the CSV file
    pub csv_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportOpError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Import {
    type Error = ImportOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        let inventory = ctx.inventory(&state).await?;
        let file = File::open(&self.csv_path)?;
        let summary = inventory.import(&self.bucket, file).await?;

        Ok(format!(
            "Imported {} tokens into {} ({} duplicates, {} invalid rows)",
            summary.completed, self.bucket, summary.duplicate, summary.invalid
        ))
    }
}
