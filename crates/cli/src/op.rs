use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use common::prelude::{Inventory, InventoryError, JsonFileStore};

use crate::state::{AppState, StateError};

/// Resolve the operator name for this invocation.
///
/// Priority: explicit `--actor` flag > `$USER` > `$USERNAME` > "anonymous".
pub fn resolve_actor(explicit: Option<String>) -> String {
    if let Some(actor) = explicit {
        return actor;
    }
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_actor_explicit_wins() {
        let result = resolve_actor(Some("mona".to_string()));
        assert_eq!(result, "mona");
    }

    #[test]
    fn test_resolve_actor_never_empty() {
        // Whatever the environment provides, something non-empty comes back
        let result = resolve_actor(None);
        assert!(!result.is_empty());
    }
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom state path (defaults to ~/.vendo)
    pub config_path: Option<PathBuf>,
    /// Who is running the command
    pub actor: String,
}

impl OpContext {
    /// Create context with an optional state path override and a resolved actor
    pub fn new(config_path: Option<PathBuf>, actor: String) -> Self {
        Self { config_path, actor }
    }

    /// Load the state directory for this invocation
    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Open the inventory backed by the state directory's registry file
    pub async fn inventory(&self, state: &AppState) -> Result<Inventory, InventoryError> {
        let store = Arc::new(JsonFileStore::new(state.registry_path.clone()));
        Inventory::open(store).await
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
