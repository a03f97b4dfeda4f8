#![forbid(unsafe_code)]

//! Identifiers for tabs and tab groups.
//!
//! Two key schemes coexist:
//!
//! - [`TabId`] doubles as the *legacy* group key: a group is named after one
//!   of its current members (the representative, or "root").
//! - [`GroupToken`] is the *stable* group key: an opaque 128-bit token that
//!   survives membership changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of one tab inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    /// Wrap a raw tab id.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TabId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Opaque, collision-resistant group token.
///
/// Backed by a random (v4) UUID so tokens minted on different devices never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupToken(Uuid);

impl GroupToken {
    /// Mint a fresh random token.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Rebuild a token from its 128-bit value.
    #[must_use]
    pub const fn from_u128(raw: u128) -> Self {
        Self(Uuid::from_u128(raw))
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0.as_u128()
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for GroupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_tokens_are_distinct() {
        let a = GroupToken::random();
        let b = GroupToken::random();
        assert_ne!(a, b);
    }

    #[test]
    fn token_survives_u128_conversion() {
        let token = GroupToken::from_u128(0xDEAD_BEEF_0000_0001);
        assert_eq!(token.as_u128(), 0xDEAD_BEEF_0000_0001);
        assert_eq!(GroupToken::from_u128(token.as_u128()), token);
    }

    #[test]
    fn tab_id_serializes_transparently() {
        let json = serde_json::to_string(&TabId::new(42)).expect("serialize");
        assert_eq!(json, "42");
        let token = GroupToken::from_u128(7);
        let json = serde_json::to_string(&token).expect("serialize");
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000007\"");
    }

    #[test]
    fn tab_id_display_is_prefixed() {
        assert_eq!(TabId::new(3).to_string(), "tab#3");
    }
}
