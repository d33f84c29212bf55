//! # Grants
//!
//! A grant gives the bearer of an access token download rights until a fixed
//! expiry. Grants are immutable once created.

use crate::error::{ShopError, ShopResult};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of random bytes in a token (64 hex characters once encoded)
pub const TOKEN_BYTES: usize = 32;

/// Lifetime of every grant
pub const GRANT_TTL_HOURS: i64 = 24;

/// Resource indices every grant covers. All four point at the same file.
pub const DEFAULT_RESOURCES: [u32; 4] = [0, 1, 2, 3];

/// Opaque bearer token identifying a grant
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Mint a token from the OS random source.
    ///
    /// Fails only if the OS refuses to provide entropy.
    pub fn generate() -> ShopResult<Self> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ShopError::Randomness(e.to_string()))?;
        Ok(Self(hex::encode(bytes)))
    }

    /// Get the token as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Download rights attached to a token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Buyer email or placeholder. Informational only.
    pub identity: String,

    /// Resource indices this grant covers
    pub resources: BTreeSet<u32>,

    /// Creation timestamp
    pub issued_at: DateTime<Utc>,

    /// Grant is valid strictly before this instant
    pub expires_at: DateTime<Utc>,
}

impl Grant {
    /// Create a grant issued at `now` with the standard lifetime
    pub fn new(identity: impl Into<String>, resources: BTreeSet<u32>, now: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            resources,
            issued_at: now,
            expires_at: now + Self::ttl(),
        }
    }

    /// The fixed grant lifetime
    pub fn ttl() -> Duration {
        Duration::hours(GRANT_TTL_HOURS)
    }

    /// The default resource set
    pub fn default_resources() -> BTreeSet<u32> {
        DEFAULT_RESOURCES.into_iter().collect()
    }

    /// Check validity at a given instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Check validity now
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Whether the resource index is in this grant's set
    pub fn covers(&self, index: u32) -> bool {
        self.resources.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_hex_chars() {
        let token = AccessToken::generate().unwrap();
        assert_eq!(token.as_str().len(), TOKEN_BYTES * 2);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_grant_validity_window() {
        let now = Utc::now();
        let grant = Grant::new("a@b.com", Grant::default_resources(), now);

        assert!(grant.is_valid_at(now));
        assert!(grant.is_valid_at(now + Duration::hours(23) + Duration::minutes(59)));
        assert!(!grant.is_valid_at(now + Duration::hours(24)));
        assert!(!grant.is_valid_at(now + Duration::days(2)));
    }

    #[test]
    fn test_default_resources() {
        let grant = Grant::new("buyer", Grant::default_resources(), Utc::now());
        assert_eq!(grant.resources.len(), 4);
        assert!(grant.covers(0));
        assert!(grant.covers(3));
        assert!(!grant.covers(4));
    }
}
