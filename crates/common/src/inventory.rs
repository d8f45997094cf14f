use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::bucket::{Bucket, BucketKind, BucketStats, PushOutcome};
use crate::import::{import_csv, ImportError, ImportSummary};
use crate::recipient::Recipient;
use crate::redeem::{RedeemError, RedemptionClient};
use crate::registry::Registry;
use crate::store::{RegistryStore, StoreError};
use crate::token::{Token, TokenSnapshot};

/**
 * Inventory
 * =========
 * The long-lived service handle over one registry. All host surfaces
 *  (the CLI today) go through this type rather than touching the
 *  registry directly.
 * Every mutation runs under the registry write lock and re-saves the
 *  whole registry through the store before returning, so persisted
 *  snapshots land in mutation order. When a save fails the in-memory
 *  registry stays canonical and the error reports the store problem.
 * The one deliberate exception to lock scope is voucher redemption:
 *  the HTTP round-trip runs with no lock held, and the commit step
 *  re-validates the token before recording anything.
 */

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("no bucket named {0}")]
    NoSuchBucket(String),
    #[error("bucket name {0} is taken")]
    NameTaken(String),
    #[error("bucket {0} is a {1} bucket")]
    WrongKind(String, BucketKind),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("import error: {0}")]
    Import(#[from] ImportError),
}

/// What came of one redemption attempt. Only `Applied` changed any state.
#[derive(Debug)]
pub enum ApplyOutcome {
    Applied(TokenSnapshot),
    AccountOutOfRange,
    Ineligible,
    RedemptionFailed(RedeemError),
}

#[derive(Clone)]
pub struct Inventory {
    registry: Arc<RwLock<Registry>>,
    store: Arc<dyn RegistryStore>,
}

impl Inventory {
    /// Load the persisted registry, or initialize an empty one and
    /// immediately save it as the new canonical state.
    pub async fn open(store: Arc<dyn RegistryStore>) -> Result<Self, InventoryError> {
        let registry = match store.load().await? {
            Some(registry) => {
                tracing::debug!("loaded registry with {} buckets", registry.len());
                registry
            }
            None => {
                let registry = Registry::new();
                store.save(&registry).await?;
                tracing::debug!("store was empty, initialized a fresh registry");
                registry
            }
        };
        Ok(Self {
            registry: Arc::new(RwLock::new(registry)),
            store,
        })
    }

    /// Every bucket with its kind and counts, sorted by name.
    pub async fn buckets(&self) -> Vec<(String, BucketKind, BucketStats)> {
        let now = Utc::now();
        let registry = self.registry.read().await;
        registry
            .iter()
            .map(|(name, bucket)| (name.to_string(), bucket.kind(), bucket.info(now)))
            .collect()
    }

    pub async fn stats(&self, name: &str) -> Result<BucketStats, InventoryError> {
        let registry = self.registry.read().await;
        let bucket = registry
            .get(name)
            .ok_or_else(|| InventoryError::NoSuchBucket(name.to_string()))?;
        Ok(bucket.info(Utc::now()))
    }

    pub async fn kind(&self, name: &str) -> Result<BucketKind, InventoryError> {
        let registry = self.registry.read().await;
        let bucket = registry
            .get(name)
            .ok_or_else(|| InventoryError::NoSuchBucket(name.to_string()))?;
        Ok(bucket.kind())
    }

    pub async fn create(&self, name: &str, kind: BucketKind) -> Result<(), InventoryError> {
        let mut registry = self.registry.write().await;
        if !registry.create(name, kind) {
            return Err(InventoryError::NameTaken(name.to_string()));
        }
        self.store.save(&registry).await?;
        tracing::debug!("created {} bucket {}", kind, name);
        Ok(())
    }

    /// Drop a bucket and everything in it. Returns the dropped bucket so
    /// hosts can report what was lost.
    pub async fn destroy(&self, name: &str) -> Result<Bucket, InventoryError> {
        let mut registry = self.registry.write().await;
        let bucket = registry
            .remove(name)
            .ok_or_else(|| InventoryError::NoSuchBucket(name.to_string()))?;
        self.store.save(&registry).await?;
        tracing::debug!("destroyed bucket {} with {} tokens", name, bucket.len());
        Ok(bucket)
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), InventoryError> {
        let mut registry = self.registry.write().await;
        if !registry.exists(from) {
            return Err(InventoryError::NoSuchBucket(from.to_string()));
        }
        if !registry.rename(from, to) {
            return Err(InventoryError::NameTaken(to.to_string()));
        }
        self.store.save(&registry).await?;
        Ok(())
    }

    pub async fn push(
        &self,
        bucket: &str,
        token: Token,
        force: bool,
    ) -> Result<PushOutcome, InventoryError> {
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        let outcome = target.push(token, force);
        if outcome == PushOutcome::Completed {
            self.store.save(&registry).await?;
        }
        Ok(outcome)
    }

    /// Mint `count` tokens with random codes and the shared metadata. A code
    /// collision with an existing token just regenerates.
    pub async fn generate(
        &self,
        bucket: &str,
        count: usize,
        value: Option<String>,
        expiry: Option<DateTime<Utc>>,
        label: Option<String>,
    ) -> Result<Vec<TokenSnapshot>, InventoryError> {
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;

        let mut minted = Vec::with_capacity(count);
        for _ in 0..count {
            loop {
                let token = Token::generate(value.clone(), expiry, label.clone());
                let snapshot = token.snapshot();
                match target.push(token, false) {
                    PushOutcome::Completed => {
                        minted.push(snapshot);
                        break;
                    }
                    PushOutcome::Duplicate | PushOutcome::Invalid => continue,
                }
            }
        }
        if !minted.is_empty() {
            self.store.save(&registry).await?;
        }
        Ok(minted)
    }

    /// Run a CSV stream into the bucket. Rows are processed sequentially
    /// under the registry lock and the registry is saved once at the end.
    pub async fn import<R: std::io::Read + Send>(
        &self,
        bucket: &str,
        reader: R,
    ) -> Result<ImportSummary, InventoryError> {
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        let summary = import_csv(reader, target)?;
        if summary.completed > 0 {
            self.store.save(&registry).await?;
        }
        Ok(summary)
    }

    /// Issue up to `count` tokens to `recipient`. Fewer than `count` means
    /// the bucket ran short, which is not an error.
    pub async fn issue(
        &self,
        bucket: &str,
        recipient: &mut Recipient,
        count: usize,
    ) -> Result<Vec<TokenSnapshot>, InventoryError> {
        let now = Utc::now();
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        let issued = target.issue_to(recipient, count, now);
        if !issued.is_empty() {
            self.store.save(&registry).await?;
        }
        Ok(issued)
    }

    /// Peek at the next redemption candidate without taking it. Voucher
    /// buckets only.
    pub async fn get_code(
        &self,
        bucket: &str,
        match_value: Option<&str>,
    ) -> Result<Option<TokenSnapshot>, InventoryError> {
        let now = Utc::now();
        let registry = self.registry.read().await;
        let target = registry
            .get(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        Self::require_kind(bucket, target, BucketKind::MullvadCodes)?;
        Ok(target.get_code(match_value, now).map(|token| token.snapshot()))
    }

    /// Redeem `code` against the recipient's account at `account_index`,
    /// then record the issuance.
    ///
    /// The account is resolved before anything touches the network, and the
    /// registry lock is released for the HTTP round-trip. The commit step
    /// re-validates the token; a token that was consumed or expired in the
    /// meantime comes back as `Ineligible` with no state change.
    pub async fn apply(
        &self,
        bucket: &str,
        recipient: &mut Recipient,
        account_index: usize,
        code: &str,
        redeemer: &RedemptionClient,
    ) -> Result<ApplyOutcome, InventoryError> {
        let Some(account) = recipient.account(account_index).map(str::to_string) else {
            return Ok(ApplyOutcome::AccountOutOfRange);
        };

        {
            let now = Utc::now();
            let registry = self.registry.read().await;
            let target = registry
                .get(bucket)
                .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
            Self::require_kind(bucket, target, BucketKind::MullvadCodes)?;
            match target.get(code) {
                Some(token) if !token.is_issued() && !token.is_expired(now) => {}
                _ => return Ok(ApplyOutcome::Ineligible),
            }
        }

        if let Err(err) = redeemer.submit(&account, code).await {
            tracing::warn!("redemption of {} failed: {}", code, err);
            return Ok(ApplyOutcome::RedemptionFailed(err));
        }

        let now = Utc::now();
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        let snapshot = match target.issue_code(code, recipient, now) {
            Ok(snapshot) => snapshot,
            Err(_) => return Ok(ApplyOutcome::Ineligible),
        };
        self.store.save(&registry).await?;
        Ok(ApplyOutcome::Applied(snapshot))
    }

    pub async fn clean_expired(&self, bucket: &str) -> Result<usize, InventoryError> {
        let now = Utc::now();
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        let removed = target.clean_expired(now);
        if removed > 0 {
            self.store.save(&registry).await?;
        }
        Ok(removed)
    }

    pub async fn clean_issued(&self, bucket: &str) -> Result<usize, InventoryError> {
        let mut registry = self.registry.write().await;
        let target = registry
            .get_mut(bucket)
            .ok_or_else(|| InventoryError::NoSuchBucket(bucket.to_string()))?;
        let removed = target.clean_issued();
        if removed > 0 {
            self.store.save(&registry).await?;
        }
        Ok(removed)
    }

    fn require_kind(name: &str, bucket: &Bucket, kind: BucketKind) -> Result<(), InventoryError> {
        if bucket.kind() != kind {
            return Err(InventoryError::WrongKind(name.to_string(), bucket.kind()));
        }
        Ok(())
    }
}
