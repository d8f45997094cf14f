use clap::Args;
use url::Url;

use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Voucher submission endpoint written into the new config
    #[arg(long)]
    pub submit_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        // The operator who initializes the directory becomes its first admin
        let config = AppConfig {
            admins: vec![ctx.actor.clone()],
            submit_url: self.submit_url.clone(),
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized vendo directory at: {}\n\
             - Config: {}\n\
             - Registry: {}\n\
             - Users: {}\n\
             - Admin: {}",
            state.vendo_dir.display(),
            state.config_path.display(),
            state.registry_path.display(),
            state.users_path.display(),
            ctx.actor
        );

        Ok(output)
    }
}
