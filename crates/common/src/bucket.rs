use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recipient::Recipient;
use crate::token::{Token, TokenError, TokenSnapshot};

/**
 * Buckets
 * =======
 * A bucket is a named pool of single-use tokens, keyed by code.
 *  Uniqueness is enforced at insertion, and enumeration order is
 *  the BTreeMap order (lexicographic by code), which is what makes
 *  issuance scans deterministic.
 * A bucket carries a kind tag. The kind decides what issuance does
 *  on top of the shared operation set: plain buckets just hand codes
 *  out, account buckets additionally record the granted account on
 *  the recipient, and voucher buckets participate in the redemption
 *  flow driven by the inventory layer.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    #[default]
    Generic,
    MullvadCodes,
    MullvadAccounts,
}

impl std::fmt::Display for BucketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BucketKind::Generic => "generic",
            BucketKind::MullvadCodes => "mullvad-codes",
            BucketKind::MullvadAccounts => "mullvad-accounts",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for BucketKind {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "generic" => Ok(BucketKind::Generic),
            "mullvad-codes" => Ok(BucketKind::MullvadCodes),
            "mullvad-accounts" => Ok(BucketKind::MullvadAccounts),
            other => Err(BucketError::UnknownKind(other.to_string())),
        }
    }
}

/// Per-row insertion result. Bulk import tallies these instead of treating
/// "already imported" as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Completed,
    Duplicate,
    Invalid,
}

/// Aggregate counts over one bucket. `issued` and `expired` may overlap:
/// an issued token can also be past its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketStats {
    pub total: usize,
    pub issued: usize,
    pub expired: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    #[error("no token with code {0}")]
    NoSuchToken(String),
    #[error("token {0} is already issued")]
    AlreadyIssued(String),
    #[error("token {0} is expired")]
    Expired(String),
    #[error("unknown bucket kind: {0}")]
    UnknownKind(String),
}

impl From<TokenError> for BucketError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::AlreadyIssued(code) => BucketError::AlreadyIssued(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    kind: BucketKind,
    tokens: BTreeMap<String, Token>,
}

impl Bucket {
    pub fn new(kind: BucketKind) -> Self {
        Self {
            kind,
            tokens: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> BucketKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Token> {
        self.tokens.get(code)
    }

    /// Insert a token under its code.
    ///
    /// Invalid when the code is empty or whitespace; Duplicate when the code
    /// is already present and `force` is false (the bucket is untouched);
    /// with `force` the existing token is replaced.
    pub fn push(&mut self, token: Token, force: bool) -> PushOutcome {
        if token.code().trim().is_empty() {
            return PushOutcome::Invalid;
        }
        if !force && self.tokens.contains_key(token.code()) {
            return PushOutcome::Duplicate;
        }
        self.tokens.insert(token.code().to_string(), token);
        PushOutcome::Completed
    }

    /// Issue up to `count` eligible tokens (not issued, not expired) to
    /// `recipient`, in code order.
    ///
    /// Returns the snapshots in selection order. Fewer than `count` (or
    /// none) simply means the bucket ran short; callers check the length.
    /// For account buckets every issued code is also appended to
    /// `recipient.accounts`, in issuance order.
    pub fn issue_to(
        &mut self,
        recipient: &mut Recipient,
        count: usize,
        now: DateTime<Utc>,
    ) -> Vec<TokenSnapshot> {
        let grant_accounts = self.kind == BucketKind::MullvadAccounts;
        let mut issued = Vec::new();
        for token in self.tokens.values_mut() {
            if issued.len() == count {
                break;
            }
            if token.is_issued() || token.is_expired(now) {
                continue;
            }
            // eligibility was just checked, so issuance cannot be rejected
            let Ok(snapshot) = token.issue_to(&recipient.id, now) else {
                continue;
            };
            recipient.record_issued();
            if grant_accounts {
                recipient.grant_account(&snapshot.code);
            }
            issued.push(snapshot);
        }
        issued
    }

    /// Issue one specific token by code. This is the commit step of the
    /// redemption flow: eligibility is re-validated here because the caller
    /// released the registry lock for the network round-trip.
    pub fn issue_code(
        &mut self,
        code: &str,
        recipient: &mut Recipient,
        now: DateTime<Utc>,
    ) -> Result<TokenSnapshot, BucketError> {
        let grant_accounts = self.kind == BucketKind::MullvadAccounts;
        let token = self
            .tokens
            .get_mut(code)
            .ok_or_else(|| BucketError::NoSuchToken(code.to_string()))?;
        if token.is_expired(now) {
            return Err(BucketError::Expired(code.to_string()));
        }
        let snapshot = token.issue_to(&recipient.id, now)?;
        recipient.record_issued();
        if grant_accounts {
            recipient.grant_account(&snapshot.code);
        }
        Ok(snapshot)
    }

    /// Pick the next candidate for handout or redemption.
    ///
    /// Eligible tokens (not issued, not expired) are ordered by ascending
    /// expiry; tokens without an expiry sort last; ties break on code. With
    /// `match_value` the first eligible token whose value equals it wins.
    pub fn get_code(&self, match_value: Option<&str>, now: DateTime<Utc>) -> Option<&Token> {
        let mut eligible: Vec<&Token> = self
            .tokens
            .values()
            .filter(|t| !t.is_issued() && !t.is_expired(now))
            .collect();
        eligible.sort_by(|a, b| match (a.expiry(), b.expiry()) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.code().cmp(b.code())),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.code().cmp(b.code()),
        });
        match match_value {
            Some(value) => eligible.into_iter().find(|t| t.value() == Some(value)),
            None => eligible.into_iter().next(),
        }
    }

    /// Drop every token that is expired at `now`. Irreversible; returns how
    /// many were removed.
    pub fn clean_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired(now));
        before - self.tokens.len()
    }

    /// Drop every issued token. Irreversible; returns how many were removed.
    pub fn clean_issued(&mut self) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_issued());
        before - self.tokens.len()
    }

    /// One pass over the bucket producing aggregate counts.
    pub fn info(&self, now: DateTime<Utc>) -> BucketStats {
        let mut stats = BucketStats::default();
        for token in self.tokens.values() {
            stats.total += 1;
            if token.is_issued() {
                stats.issued += 1;
            }
            if token.is_expired(now) {
                stats.expired += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    fn token(code: &str) -> Token {
        Token::new(code.to_string(), None, None, None)
    }

    fn token_with_expiry(code: &str, expiry: DateTime<Utc>) -> Token {
        Token::new(code.to_string(), None, Some(expiry), None)
    }

    fn token_with_value(code: &str, value: &str) -> Token {
        Token::new(code.to_string(), Some(value.to_string()), None, None)
    }

    #[test]
    fn test_push_dedupes_by_code() {
        let mut bucket = Bucket::new(BucketKind::Generic);
        assert_eq!(bucket.push(token("A"), false), PushOutcome::Completed);
        assert_eq!(bucket.push(token("A"), false), PushOutcome::Duplicate);
        assert_eq!(bucket.len(), 1);

        // force replaces the stored token
        let replacement = token_with_value("A", "5 days");
        assert_eq!(bucket.push(replacement, true), PushOutcome::Completed);
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.get("A").unwrap().value(), Some("5 days"));
    }

    #[test]
    fn test_push_rejects_blank_codes() {
        let mut bucket = Bucket::new(BucketKind::Generic);
        assert_eq!(bucket.push(token(""), false), PushOutcome::Invalid);
        assert_eq!(bucket.push(token("   "), false), PushOutcome::Invalid);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_issue_to_returns_short_count() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token("A"), false);
        bucket.push(token("B"), false);

        let mut mona = Recipient::new("mona".to_string());
        let issued = bucket.issue_to(&mut mona, 5, now);
        assert_eq!(issued.len(), 2);
        assert_eq!(mona.issued_count, 2);

        // nothing eligible is left
        let more = bucket.issue_to(&mut mona, 1, now);
        assert!(more.is_empty());
        assert_eq!(mona.issued_count, 2);
    }

    #[test]
    fn test_issue_to_skips_expired_and_issued() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token_with_expiry("OLD", now - Duration::days(1)), false);
        bucket.push(token("FRESH"), false);

        let mut mona = Recipient::new("mona".to_string());
        let issued = bucket.issue_to(&mut mona, 10, now);
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].code, "FRESH");

        // re-invoking never hands out an already-issued token
        let mut rex = Recipient::new("rex".to_string());
        assert!(bucket.issue_to(&mut rex, 10, now).is_empty());
        assert_eq!(bucket.get("FRESH").unwrap().issued_to(), Some("mona"));
    }

    #[test]
    fn test_issue_to_selection_order_is_code_order() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token("C"), false);
        bucket.push(token("A"), false);
        bucket.push(token("B"), false);

        let mut mona = Recipient::new("mona".to_string());
        let issued = bucket.issue_to(&mut mona, 2, now);
        let codes: Vec<&str> = issued.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
    }

    #[test]
    fn test_account_bucket_grants_accounts_in_order() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::MullvadAccounts);
        bucket.push(token("1111"), false);
        bucket.push(token("2222"), false);
        bucket.push(token("3333"), false);

        let mut mona = Recipient::new("mona".to_string());
        let issued = bucket.issue_to(&mut mona, 2, now);
        assert_eq!(issued.len(), 2);
        assert_eq!(mona.accounts, vec!["1111", "2222"]);
        assert_eq!(mona.issued_count, 2);

        // indices stay stable as more accounts are granted
        bucket.issue_to(&mut mona, 1, now);
        assert_eq!(mona.account(0), Some("1111"));
        assert_eq!(mona.account(2), Some("3333"));
    }

    #[test]
    fn test_generic_bucket_grants_no_accounts() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token("A"), false);

        let mut mona = Recipient::new("mona".to_string());
        bucket.issue_to(&mut mona, 1, now);
        assert!(mona.accounts.is_empty());
        assert_eq!(mona.issued_count, 1);
    }

    #[test]
    fn test_get_code_prefers_soonest_expiry() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::MullvadCodes);
        bucket.push(token_with_expiry("LATER", now + Duration::days(30)), false);
        bucket.push(token_with_expiry("SOON", now + Duration::days(1)), false);
        bucket.push(token("FOREVER"), false);

        assert_eq!(bucket.get_code(None, now).unwrap().code(), "SOON");
    }

    #[test]
    fn test_get_code_no_expiry_sorts_last() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::MullvadCodes);
        bucket.push(token("AAAA"), false);
        bucket.push(token_with_expiry("ZZZZ", now + Duration::days(365)), false);

        // the dated token wins even though its code sorts later
        assert_eq!(bucket.get_code(None, now).unwrap().code(), "ZZZZ");
    }

    #[test]
    fn test_get_code_match_value() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::MullvadCodes);
        bucket.push(token_with_value("A", "1 month"), false);
        bucket.push(token_with_value("B", "6 months"), false);

        assert_eq!(
            bucket.get_code(Some("6 months"), now).unwrap().code(),
            "B"
        );
        assert!(bucket.get_code(Some("1 year"), now).is_none());
    }

    #[test]
    fn test_get_code_skips_ineligible() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::MullvadCodes);
        bucket.push(token_with_expiry("GONE", now - Duration::days(1)), false);
        bucket.push(token("LEFT"), false);

        let mut mona = Recipient::new("mona".to_string());
        bucket.issue_code("LEFT", &mut mona, now).unwrap();
        assert!(bucket.get_code(None, now).is_none());
    }

    #[test]
    fn test_issue_code_revalidates() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::MullvadCodes);
        bucket.push(token("A"), false);
        bucket.push(token_with_expiry("OLD", now - Duration::days(1)), false);

        let mut mona = Recipient::new("mona".to_string());
        assert!(matches!(
            bucket.issue_code("MISSING", &mut mona, now),
            Err(BucketError::NoSuchToken(_))
        ));
        assert!(matches!(
            bucket.issue_code("OLD", &mut mona, now),
            Err(BucketError::Expired(_))
        ));

        bucket.issue_code("A", &mut mona, now).unwrap();
        assert!(matches!(
            bucket.issue_code("A", &mut mona, now),
            Err(BucketError::AlreadyIssued(_))
        ));
        assert_eq!(mona.issued_count, 1);
    }

    #[test]
    fn test_clean_expired_then_info_reports_zero() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token_with_expiry("OLD1", now - Duration::days(2)), false);
        bucket.push(token_with_expiry("OLD2", now - Duration::hours(1)), false);
        bucket.push(token("KEEP"), false);

        assert_eq!(bucket.clean_expired(now), 2);
        let stats = bucket.info(now);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.expired, 0);
    }

    #[test]
    fn test_clean_issued_then_info_reports_zero() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token("A"), false);
        bucket.push(token("B"), false);

        let mut mona = Recipient::new("mona".to_string());
        bucket.issue_to(&mut mona, 1, now);

        assert_eq!(bucket.clean_issued(), 1);
        let stats = bucket.info(now);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.issued, 0);
    }

    #[test]
    fn test_info_counts_overlap() {
        let now = Utc::now();
        let mut bucket = Bucket::new(BucketKind::Generic);
        bucket.push(token_with_expiry("BOTH", now + Duration::hours(1)), false);

        let mut mona = Recipient::new("mona".to_string());
        bucket.issue_to(&mut mona, 1, now);

        // issued now, expired later: counted in both columns
        let later = now + Duration::days(1);
        let stats = bucket.info(later);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.expired, 1);
    }

    #[test]
    fn test_kind_round_trips_through_strings() {
        for kind in [
            BucketKind::Generic,
            BucketKind::MullvadCodes,
            BucketKind::MullvadAccounts,
        ] {
            let parsed: BucketKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("mullvad_codes".parse::<BucketKind>().is_ok());
        assert!("shoebox".parse::<BucketKind>().is_err());
    }

    #[test]
    fn test_serde_keeps_kind_tag() {
        let mut bucket = Bucket::new(BucketKind::MullvadCodes);
        bucket.push(token("A"), false);

        let json = serde_json::to_string(&bucket).unwrap();
        assert!(json.contains("mullvad_codes"));
        let back: Bucket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bucket);
        assert_eq!(back.kind(), BucketKind::MullvadCodes);
    }
}
