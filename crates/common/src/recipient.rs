use serde::{Deserialize, Serialize};

/// The host-owned identity a token is issued to.
///
/// The host (chat adapter, CLI, ...) owns the directory of recipients; the
/// inventory only writes the two side-channel attributes below while issuing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    /// Running count of tokens this recipient has been issued, across all
    /// buckets and kinds.
    pub issued_count: u64,
    /// Mullvad account numbers granted to this recipient, in issuance order.
    /// Redemption later refers to entries by index, so the order is never
    /// changed once an entry is appended.
    pub accounts: Vec<String>,
}

impl Recipient {
    pub fn new(id: String) -> Self {
        Self {
            id,
            issued_count: 0,
            accounts: Vec::new(),
        }
    }

    pub fn account(&self, index: usize) -> Option<&str> {
        self.accounts.get(index).map(String::as_str)
    }

    pub(crate) fn record_issued(&mut self) {
        self.issued_count += 1;
    }

    pub(crate) fn grant_account(&mut self, code: &str) {
        self.accounts.push(code.to_string());
    }
}

/// The authorization collaborator's contract.
///
/// Both predicates are answered by the host; the inventory core never
/// evaluates them itself. Hosts must fail closed: a false answer means the
/// command does not run.
pub trait AccessPolicy: Send + Sync {
    /// May `actor` run bucket/token-mutating commands?
    fn is_admin(&self, actor: &str) -> bool;

    /// May `recipient` be the target of issuance or redemption?
    fn can_receive(&self, recipient: &str) -> bool;
}
