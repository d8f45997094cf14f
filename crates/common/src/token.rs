use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Alphabet for generated codes. Ambiguous glyphs (0/O, 1/I) are left out.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_GROUPS: usize = 4;
const CODE_GROUP_LEN: usize = 4;

/// A single-use unit of value: a promo code, a voucher, an account number.
///
/// A token is identified by its `code` within the bucket that owns it. It is
/// created unissued and becomes issued at most once; the issuance fields are
/// never cleared afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    code: String,
    value: Option<String>,
    expiry: Option<DateTime<Utc>>,
    label: Option<String>,
    added_at: DateTime<Utc>,
    issued_to: Option<String>,
    issued_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token {0} is already issued")]
    AlreadyIssued(String),
}

impl Token {
    pub fn new(
        code: String,
        value: Option<String>,
        expiry: Option<DateTime<Utc>>,
        label: Option<String>,
    ) -> Self {
        Self {
            code,
            value,
            expiry,
            label,
            added_at: Utc::now(),
            issued_to: None,
            issued_at: None,
        }
    }

    /// Mint a token with a freshly generated random code
    /// (`XXXX-XXXX-XXXX-XXXX`, OS-seeded generator).
    pub fn generate(
        value: Option<String>,
        expiry: Option<DateTime<Utc>>,
        label: Option<String>,
    ) -> Self {
        Self::new(random_code(), value, expiry, label)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn issued_to(&self) -> Option<&str> {
        self.issued_to.as_deref()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    /// A token is issued iff a recipient has been recorded.
    pub fn is_issued(&self) -> bool {
        self.issued_to.is_some()
    }

    /// Strictly past its expiry at `now`. Tokens without an expiry never
    /// expire. Pure; never mutates.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry, Some(expiry) if expiry < now)
    }

    /// Mark the token issued to `recipient` at `now`.
    ///
    /// Issuance happens at most once: a second call is rejected rather than
    /// silently overwriting the original recipient.
    pub fn issue_to(
        &mut self,
        recipient: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenSnapshot, TokenError> {
        if self.is_issued() {
            return Err(TokenError::AlreadyIssued(self.code.clone()));
        }
        self.issued_to = Some(recipient.to_string());
        self.issued_at = Some(now);
        Ok(self.snapshot())
    }

    /// Immutable presentation view, decoupled from the live token.
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            code: self.code.clone(),
            value: self.value.clone(),
            expiry: self.expiry,
            label: self.label.clone(),
        }
    }
}

/// What a recipient gets handed: the fields safe to show, nothing mutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub code: String,
    pub value: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

impl std::fmt::Display for TokenSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(value) = &self.value {
            write!(f, " ({})", value)?;
        }
        if let Some(expiry) = &self.expiry {
            write!(f, " [expires {}]", expiry.format("%Y-%m-%d"))?;
        }
        if let Some(label) = &self.label {
            write!(f, " <{}>", label)?;
        }
        Ok(())
    }
}

/// Parse a date-ish string into an expiry timestamp.
///
/// Accepts RFC 3339 (`2025-06-01T12:00:00Z`), a space-separated datetime
/// (`2025-06-01 12:00:00`, UTC assumed), or a bare date (`2025-06-01`,
/// midnight UTC). Anything else is None.
pub fn parse_expiry(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

fn random_code() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let mut groups = Vec::with_capacity(CODE_GROUPS);
    for _ in 0..CODE_GROUPS {
        let group: String = (0..CODE_GROUP_LEN)
            .map(|_| {
                let idx = rng.random_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET[idx] as char
            })
            .collect();
        groups.push(group);
    }
    groups.join("-")
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_issue_once() {
        let mut token = Token::new("ABCD".to_string(), Some("30 days".to_string()), None, None);
        assert!(!token.is_issued());

        let now = Utc::now();
        let snapshot = token.issue_to("mona", now).unwrap();
        assert_eq!(snapshot.code, "ABCD");
        assert!(token.is_issued());
        assert_eq!(token.issued_to(), Some("mona"));
        assert_eq!(token.issued_at(), Some(now));

        // a second issuance is rejected and leaves the first intact
        let err = token.issue_to("rex", now).unwrap_err();
        assert!(matches!(err, TokenError::AlreadyIssued(_)));
        assert_eq!(token.issued_to(), Some("mona"));
    }

    #[test]
    fn test_expiry_is_strict_and_monotonic() {
        let now = Utc::now();
        let token = Token::new(
            "ABCD".to_string(),
            None,
            Some(now + Duration::hours(1)),
            None,
        );

        assert!(!token.is_expired(now));
        // exactly at the boundary is not yet expired
        assert!(!token.is_expired(now + Duration::hours(1)));
        assert!(token.is_expired(now + Duration::hours(1) + Duration::seconds(1)));
        // once expired, stays expired as the clock advances
        assert!(token.is_expired(now + Duration::days(400)));
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let token = Token::new("ABCD".to_string(), None, None, None);
        assert!(!token.is_expired(Utc::now() + Duration::days(365 * 100)));
    }

    #[test]
    fn test_parse_expiry_formats() {
        assert!(parse_expiry("2025-06-01T12:30:00Z").is_some());
        assert!(parse_expiry("2025-06-01 12:30:00").is_some());
        let midnight = parse_expiry("2025-06-01").unwrap();
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");

        assert!(parse_expiry("").is_none());
        assert!(parse_expiry("  ").is_none());
        assert!(parse_expiry("next tuesday").is_none());
    }

    #[test]
    fn test_generated_code_shape() {
        let token = Token::generate(Some("1 month".to_string()), None, None);
        let groups: Vec<&str> = token.code().split('-').collect();
        assert_eq!(groups.len(), 4);
        for group in groups {
            assert_eq!(group.len(), 4);
            assert!(group
                .bytes()
                .all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_codes_differ() {
        let a = Token::generate(None, None, None);
        let b = Token::generate(None, None, None);
        assert_ne!(a.code(), b.code());
    }

    #[test]
    fn test_serde_round_trip_reparses_dates() {
        let mut token = Token::new(
            "WXYZ".to_string(),
            Some("2 days".to_string()),
            parse_expiry("2030-01-01"),
            Some("mullvad.net".to_string()),
        );
        token.issue_to("mona", Utc::now()).unwrap();

        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(token, back);
        assert!(back.is_issued());
        assert_eq!(back.expiry(), token.expiry());
    }
}
