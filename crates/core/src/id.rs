// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers
//!
//! - [`ActionId`] names a kind of operation (e.g. `"submit"`)
//! - [`UniqueId`] names one lock acquisition attempt
//! - [`BoundaryId`] names the scope exclusivity is evaluated in
//! - [`GroupId`] names a coordination group

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Logical identity of an operation kind
    ActionId
);

string_id!(
    /// Identity of one specific lock acquisition
    ///
    /// Minted once per info value and reused for its paired `lock`/`unlock`.
    UniqueId
);

string_id!(
    /// The exclusivity scope a lock is evaluated in
    BoundaryId
);

string_id!(
    /// Name of a coordination group
    GroupId
);

impl UniqueId {
    /// Mint a fresh random (UUID v4) identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
