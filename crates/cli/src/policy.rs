use common::prelude::AccessPolicy;

use crate::config::AppConfig;

/// Authorization backed by the config file.
///
/// Names not on a list fail closed: an empty `admins` list means nobody may
/// mutate, while an unset `recipients` list means anyone may receive.
#[derive(Debug, Clone)]
pub struct ConfigPolicy {
    admins: Vec<String>,
    recipients: Option<Vec<String>>,
}

impl ConfigPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            admins: config.admins.clone(),
            recipients: config.recipients.clone(),
        }
    }

    pub fn require_admin(&self, actor: &str) -> Result<(), PolicyError> {
        if self.is_admin(actor) {
            Ok(())
        } else {
            Err(PolicyError::NotAdmin(actor.to_string()))
        }
    }

    pub fn require_receiver(&self, user: &str) -> Result<(), PolicyError> {
        if self.can_receive(user) {
            Ok(())
        } else {
            Err(PolicyError::NotEligible(user.to_string()))
        }
    }
}

impl AccessPolicy for ConfigPolicy {
    fn is_admin(&self, actor: &str) -> bool {
        self.admins.iter().any(|admin| admin == actor)
    }

    fn can_receive(&self, user: &str) -> bool {
        match &self.recipients {
            Some(allowed) => allowed.iter().any(|name| name == user),
            None => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("{0} is not an admin")]
    NotAdmin(String),

    #[error("{0} is not an allowed recipient")]
    NotEligible(String),
}
