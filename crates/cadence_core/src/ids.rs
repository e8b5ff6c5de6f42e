//! Typed identifiers for domain entities.
//!
//! UUID-backed ids are minted by this service; string-backed ids
//! (`AccountId`, `TargetId`) are assigned by the social platform and stored
//! verbatim.

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Borrow the wrapped UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

macro_rules! provider_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a platform-assigned identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

uuid_id!(
    /// Identifier of an authenticated user profile.
    UserId
);

uuid_id!(
    /// Identifier of a team a profile belongs to.
    TeamId
);

uuid_id!(
    /// Identifier of a content item (post, briefing, etc.).
    PostId
);

uuid_id!(
    /// Identifier of one per-target tracking row.
    TrackingId
);

uuid_id!(
    /// Identifier of an approval request.
    ApprovalId
);

provider_id!(
    /// Platform-assigned account identifier (e.g. a Facebook page id).
    AccountId
);

provider_id!(
    /// Platform-assigned destination identifier a post publishes to.
    TargetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_distinct() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn test_serde_transparent() {
        let id = AccountId::from("1784309");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1784309\"");

        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
