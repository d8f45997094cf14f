use clap::Args;

use common::prelude::InventoryError;

use crate::policy::ConfigPolicy;
use crate::users::UserDirectory;

#[derive(Args, Debug, Clone)]
pub struct Issue {
    /// Bucket to draw from
    pub bucket: String,

    /// User receiving the tokens
    pub user: String,

    /// How many tokens to issue
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("User directory error: {0}")]
    Users(#[from] crate::users::UserDirectoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Issue {
    type Error = IssueError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let policy = ConfigPolicy::from_config(&state.config);
        policy.require_admin(&ctx.actor)?;
        policy.require_receiver(&self.user)?;

        let inventory = ctx.inventory(&state).await?;
        let mut users = UserDirectory::load(&state.users_path)?;

        let issued = inventory
            .issue(&self.bucket, users.entry(&self.user), self.count)
            .await?;

        if issued.is_empty() {
            return Ok(format!("No tokens available in {}", self.bucket));
        }
        users.save(&state.users_path)?;

        let mut lines = vec![format!("Issued {} to {}:", issued.len(), self.user)];
        lines.extend(issued.iter().map(|snapshot| format!("  {}", snapshot)));
        if issued.len() < self.count {
            lines.push(format!(
                "({} of {} requested were available)",
                issued.len(),
                self.count
            ));
        }

        Ok(lines.join("\n"))
    }
}
