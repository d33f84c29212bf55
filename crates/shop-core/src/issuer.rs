//! # Grant Issuer
//!
//! Mints access tokens and records their grants in the token store.

use crate::error::ShopResult;
use crate::grant::{AccessToken, Grant};
use crate::store::TokenStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Identity recorded for paid grants when the provider reports no email
pub const BUYER_IDENTITY: &str = "buyer";

/// Identity recorded for demo grants when the client sends no email
pub const DEMO_IDENTITY: &str = "demo@example.com";

/// Creates grants and writes them into a [`TokenStore`]
#[derive(Clone, Debug)]
pub struct GrantIssuer {
    store: TokenStore,
}

impl GrantIssuer {
    /// Create an issuer writing into `store`
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    /// The store this issuer writes to
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Issue a grant for the default resource set.
    ///
    /// A missing or blank identity is recorded as [`BUYER_IDENTITY`].
    pub fn issue(&self, identity: Option<&str>) -> ShopResult<AccessToken> {
        self.issue_with_fallback(identity, BUYER_IDENTITY)
    }

    /// Issue a grant, recording `fallback` when no identity is supplied
    pub fn issue_with_fallback(
        &self,
        identity: Option<&str>,
        fallback: &str,
    ) -> ShopResult<AccessToken> {
        self.issue_at(
            resolve_identity(identity, fallback),
            Grant::default_resources(),
            Utc::now(),
        )
    }

    /// Issue a grant for an explicit resource set at an explicit time
    pub fn issue_at(
        &self,
        identity: &str,
        resources: BTreeSet<u32>,
        now: DateTime<Utc>,
    ) -> ShopResult<AccessToken> {
        let token = AccessToken::generate()?;
        let grant = Grant::new(identity, resources, now);

        debug!("Grant expires at {}", grant.expires_at.to_rfc3339());
        self.store.put(token.as_str(), grant);
        info!("Issued grant for {}", identity);

        Ok(token)
    }
}

fn resolve_identity<'a>(identity: Option<&'a str>, fallback: &'a str) -> &'a str {
    match identity.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashSet;

    #[test]
    fn test_issue_writes_grant() {
        let issuer = GrantIssuer::new(TokenStore::new());
        let token = issuer.issue(Some("a@b.com")).unwrap();

        let grant = issuer.store().get(token.as_str()).unwrap();
        assert_eq!(grant.identity, "a@b.com");
        assert_eq!(grant.resources, Grant::default_resources());
        assert_eq!(grant.expires_at - grant.issued_at, Duration::hours(24));
    }

    #[test]
    fn test_identity_placeholders() {
        let issuer = GrantIssuer::new(TokenStore::new());

        let paid = issuer.issue(None).unwrap();
        let blank = issuer.issue(Some("   ")).unwrap();
        let demo = issuer.issue_with_fallback(Some(""), DEMO_IDENTITY).unwrap();

        let store = issuer.store();
        assert_eq!(store.get(paid.as_str()).unwrap().identity, BUYER_IDENTITY);
        assert_eq!(store.get(blank.as_str()).unwrap().identity, BUYER_IDENTITY);
        assert_eq!(store.get(demo.as_str()).unwrap().identity, DEMO_IDENTITY);
    }

    #[test]
    fn test_tokens_are_unique() {
        let issuer = GrantIssuer::new(TokenStore::new());
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let token = issuer.issue(None).unwrap();
            assert!(seen.insert(token.into_string()));
        }

        assert_eq!(issuer.store().len(), 10_000);
    }

    #[test]
    fn test_issue_at_custom_resources() {
        let issuer = GrantIssuer::new(TokenStore::new());
        let then = Utc::now() - Duration::hours(1);
        let token = issuer
            .issue_at("x@y.z", [7].into_iter().collect(), then)
            .unwrap();

        let grant = issuer.store().get(token.as_str()).unwrap();
        assert_eq!(grant.issued_at, then);
        assert!(grant.covers(7));
        assert!(!grant.covers(0));
    }
}
