use clap::Args;
use url::Url;

use common::prelude::{ApplyOutcome, InventoryError, RedeemError, RedemptionClient};

use crate::policy::ConfigPolicy;
use crate::users::UserDirectory;

#[derive(Args, Debug, Clone)]
pub struct Apply {
    /// Bucket of Mullvad voucher codes to draw from
    pub bucket: String,

    /// User whose account receives the voucher
    pub user: String,

    /// Which of the user's granted accounts to top up
    #[arg(long, default_value_t = 0)]
    pub account_index: usize,

    /// Only consider codes with this value
    #[arg(long)]
    pub value: Option<String>,

    /// Voucher submission endpoint (overrides the config)
    #[arg(long)]
    pub submit_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Policy(#[from] crate::policy::PolicyError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("User directory error: {0}")]
    Users(#[from] crate::users::UserDirectoryError),
    #[error("Redemption client error: {0}")]
    Redeem(#[from] RedeemError),
}

#[async_trait::async_trait]
impl crate::op::Op for Apply {
    type Error = ApplyError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let policy = ConfigPolicy::from_config(&state.config);
        policy.require_admin(&ctx.actor)?;
        policy.require_receiver(&self.user)?;

        let inventory = ctx.inventory(&state).await?;

        // Peek first so an empty bucket is an answer, not an error
        let Some(candidate) = inventory.get_code(&self.bucket, self.value.as_deref()).await?
        else {
            return Ok(match &self.value {
                Some(value) => format!("No eligible {} codes in {}", value, self.bucket),
                None => format!("No eligible codes in {}", self.bucket),
            });
        };

        let redeemer = match self.submit_url.clone().or_else(|| state.config.submit_url.clone()) {
            Some(url) => RedemptionClient::with_base_url(url)?,
            None => RedemptionClient::new()?,
        };

        let mut users = UserDirectory::load(&state.users_path)?;
        let outcome = inventory
            .apply(
                &self.bucket,
                users.entry(&self.user),
                self.account_index,
                &candidate.code,
                &redeemer,
            )
            .await?;

        let output = match outcome {
            ApplyOutcome::Applied(snapshot) => {
                users.save(&state.users_path)?;
                format!(
                    "Applied {} to {} (account index {})",
                    snapshot, self.user, self.account_index
                )
            }
            ApplyOutcome::AccountOutOfRange => format!(
                "{} has no granted account at index {}",
                self.user, self.account_index
            ),
            ApplyOutcome::Ineligible => {
                format!("{} is no longer eligible in {}", candidate.code, self.bucket)
            }
            ApplyOutcome::RedemptionFailed(err) => {
                format!("Redemption of {} failed: {}", candidate.code, err)
            }
        };

        Ok(output)
    }
}
