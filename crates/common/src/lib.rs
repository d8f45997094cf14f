/**
 * Named pools of single-use tokens.
 *  Insertion, dedup, issuance and cleanup all
 *  live here, keyed by token code.
 */
pub mod bucket;
pub mod import;
/**
 * The long-lived service handle over one registry.
 *  Hosts drive every operation through this type;
 *  persistence and the redemption flow hang off it.
 */
pub mod inventory;
pub mod recipient;
/**
 * One-shot voucher submission against the
 *  Mullvad account endpoint.
 */
pub mod redeem;
pub mod registry;
/**
 * Persistence boundary. The registry moves
 *  through a RegistryStore wholesale, one
 *  snapshot per save.
 */
pub mod store;
pub mod token;

pub mod prelude {
    pub use crate::bucket::{Bucket, BucketError, BucketKind, BucketStats, PushOutcome};
    pub use crate::import::{import_csv, ImportError, ImportSummary};
    pub use crate::inventory::{ApplyOutcome, Inventory, InventoryError};
    pub use crate::recipient::{AccessPolicy, Recipient};
    pub use crate::redeem::{DEFAULT_SUBMIT_URL, RedeemError, RedemptionClient};
    pub use crate::registry::Registry;
    pub use crate::store::{JsonFileStore, MemoryStore, RegistryStore, StoreError};
    pub use crate::token::{parse_expiry, Token, TokenError, TokenSnapshot};
}
