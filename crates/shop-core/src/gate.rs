//! # Access Gate
//!
//! Authorizes downloads against the token store.
//!
//! The requested resource index is accepted without checking it against the
//! grant's resource set: every grant covers every index, and every index
//! resolves to the same file.

use crate::error::{ShopError, ShopResult};
use crate::resource::{Resource, DEMO_PDF};
use crate::store::TokenStore;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Token check in front of the static resource
#[derive(Clone, Debug)]
pub struct AccessGate {
    store: TokenStore,
    resource: Resource,
}

impl AccessGate {
    /// Create a gate serving [`DEMO_PDF`]
    pub fn new(store: TokenStore) -> Self {
        Self::with_resource(store, DEMO_PDF)
    }

    /// Create a gate serving a different resource
    pub fn with_resource(store: TokenStore, resource: Resource) -> Self {
        Self { store, resource }
    }

    /// Authorize a download now
    pub fn authorize(&self, token: &str, index: u32) -> ShopResult<Resource> {
        self.authorize_at(token, index, Utc::now())
    }

    /// Authorize a download at a given instant
    pub fn authorize_at(
        &self,
        token: &str,
        index: u32,
        now: DateTime<Utc>,
    ) -> ShopResult<Resource> {
        let grant = self.store.get(token).ok_or(ShopError::Unauthorized)?;

        if !grant.is_valid_at(now) {
            warn!(
                "Rejected expired grant for {} (expired {})",
                grant.identity,
                grant.expires_at.to_rfc3339()
            );
            return Err(ShopError::Unauthorized);
        }

        if !grant.covers(index) {
            debug!("Index {} outside grant set, serving anyway", index);
        }

        Ok(self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::Grant;
    use crate::issuer::GrantIssuer;
    use chrono::Duration;

    fn setup() -> (GrantIssuer, AccessGate) {
        let store = TokenStore::new();
        (GrantIssuer::new(store.clone()), AccessGate::new(store))
    }

    #[test]
    fn test_unknown_token_rejected() {
        let (_, gate) = setup();
        let zeros = "0".repeat(64);

        for token in ["", "nope", zeros.as_str()] {
            assert!(matches!(
                gate.authorize(token, 0),
                Err(ShopError::Unauthorized)
            ));
        }
    }

    #[test]
    fn test_valid_token_every_index() {
        let (issuer, gate) = setup();
        let token = issuer.issue(Some("a@b.com")).unwrap();

        for index in 0..4 {
            let resource = gate.authorize(token.as_str(), index).unwrap();
            assert_eq!(resource, DEMO_PDF);
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let (issuer, gate) = setup();
        let issued = Utc::now();
        let token = issuer
            .issue_at("a@b.com", Grant::default_resources(), issued)
            .unwrap();
        let token = token.as_str();

        assert!(gate.authorize_at(token, 0, issued).is_ok());
        assert!(gate
            .authorize_at(token, 0, issued + Duration::hours(24) - Duration::milliseconds(1))
            .is_ok());
        assert!(matches!(
            gate.authorize_at(token, 0, issued + Duration::hours(24)),
            Err(ShopError::Unauthorized)
        ));
        assert!(gate
            .authorize_at(token, 0, issued + Duration::hours(30))
            .is_err());
    }

    #[test]
    fn test_aged_grant_rejected() {
        let store = TokenStore::new();
        let gate = AccessGate::new(store.clone());
        store.put(
            "aged",
            Grant::new(
                "old@example.com",
                Grant::default_resources(),
                Utc::now() - Duration::days(1),
            ),
        );

        assert!(matches!(gate.authorize("aged", 0), Err(ShopError::Unauthorized)));
    }

    #[test]
    fn test_index_outside_set_is_served() {
        let (issuer, gate) = setup();
        let token = issuer.issue(None).unwrap();

        assert!(gate.authorize(token.as_str(), 99).is_ok());
    }
}
