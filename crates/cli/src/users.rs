use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, io};

use common::prelude::Recipient;
use serde::{Deserialize, Serialize};

/// Every user the CLI has issued to, keyed by user id.
///
/// Persisted as `users.json` next to the registry. A missing file reads as
/// empty so a freshly initialized directory needs no special casing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    users: BTreeMap<String, Recipient>,
}

impl UserDirectory {
    pub fn load(path: &Path) -> Result<Self, UserDirectoryError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), UserDirectoryError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Look up a user, creating the record on first contact
    pub fn entry(&mut self, id: &str) -> &mut Recipient {
        self.users
            .entry(id.to_string())
            .or_insert_with(|| Recipient::new(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Recipient)> {
        self.users.iter().map(|(id, user)| (id.as_str(), user))
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserDirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
