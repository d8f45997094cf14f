use clap::Args;

use common::prelude::{parse_expiry, InventoryError, PushOutcome, Token};

use crate::policy::ConfigPolicy;

#[derive(Args, Debug, Clone)]
pub struct Add {
    /// Bucket to add the token to
    pub bucket: String,

    /// The token code itself
    pub code: String,

    /// Worth of the token, free-form (for example "30" or "6 months")
    #[arg(long)]
    pub value: Option<String>,

    /// Expiry as RFC 3339, "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD"
    #[arg(long)]
    pub expiry: Option<String>,

    /// Provenance note
    #[arg(long)]
    pub label: Option<String>,

    /// Replace an existing token with the same code
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
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
impl crate::op::Op for Add {
    type Error = AddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        ConfigPolicy::from_config(&state.config).require_admin(&ctx.actor)?;

        // Unlike CSV import, a mistyped expiry on the command line is an error
        let expiry = match &self.expiry {
            Some(raw) => {
                Some(parse_expiry(raw).ok_or_else(|| AddError::BadExpiry(raw.clone()))?)
            }
            None => None,
        };

        let inventory = ctx.inventory(&state).await?;
        let token = Token::new(
            self.code.clone(),
            self.value.clone(),
            expiry,
            self.label.clone(),
        );

        let output = match inventory.push(&self.bucket, token, self.force).await? {
            PushOutcome::Completed => format!("Added {} to {}", self.code, self.bucket),
            PushOutcome::Duplicate => format!(
                "{} is already in {} (use --force to replace it)",
                self.code, self.bucket
            ),
            PushOutcome::Invalid => format!("{:?} is not a usable code", self.code),
        };

        Ok(output)
    }
}
