use clap::Args;

use crate::users::UserDirectory;

#[derive(Args, Debug, Clone)]
pub struct Users;

#[derive(Debug, thiserror::Error)]
pub enum UsersError {
    #[error("State error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("User directory error: {0}")]
    Users(#[from] crate::users::UserDirectoryError),
}

#[async_trait::async_trait]
impl crate::op::Op for Users {
    type Error = UsersError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let users = UserDirectory::load(&state.users_path)?;

        if users.is_empty() {
            return Ok("No users recorded".to_string());
        }

        let output = users
            .iter()
            .map(|(id, user)| {
                let accounts = if user.accounts.is_empty() {
                    "none".to_string()
                } else {
                    user.accounts.join(", ")
                };
                format!("{}: {} issued, accounts: {}", id, user.issued_count, accounts)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(output)
    }
}
