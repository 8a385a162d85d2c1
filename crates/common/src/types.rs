use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EmptyIdentifierError;

/// Canonical, type-erased identity of an aggregate instance.
///
/// Holds the `"<Kind>:<raw>"` string. Equality and hashing are defined on that
/// string alone, so two ids are equal iff their canonical forms are equal and
/// ids of different kinds never collide even when their raw values do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Creates an aggregate ID from a kind prefix and a raw value.
    pub fn new(kind: &str, raw: &str) -> Self {
        Self(format!("{kind}:{raw}"))
    }

    /// Returns the kind prefix (e.g. `"Game"`).
    pub fn kind(&self) -> &str {
        self.0.split_once(':').map(|(kind, _)| kind).unwrap_or("")
    }

    /// Returns the raw value without the kind prefix.
    pub fn value(&self) -> &str {
        self.0.split_once(':').map(|(_, raw)| raw).unwrap_or(&self.0)
    }

    /// Returns the canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed identifier that knows its semantic kind.
pub trait Identifier: Clone + fmt::Display + Send + Sync {
    /// Kind prefix used in the canonical form.
    const KIND: &'static str;

    /// Returns the raw value.
    fn raw(&self) -> &str;

    /// Returns the canonical identity used by the event store.
    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(Self::KIND, self.raw())
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from a raw value.
            ///
            /// Fails with [`EmptyIdentifierError`] when the value is blank.
            pub fn new(raw: impl Into<String>) -> Result<Self, EmptyIdentifierError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(EmptyIdentifierError { kind: $kind });
                }
                Ok(Self(raw))
            }

            /// Returns the raw value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Identifier for $name {
            const KIND: &'static str = $kind;

            fn raw(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $kind, self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdentifierError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&$name> for AggregateId {
            fn from(id: &$name) -> Self {
                id.aggregate_id()
            }
        }
    };
}

identifier!(
    /// Identifier of a game.
    GameId,
    "Game"
);

identifier!(
    /// Identifier of a player profile.
    PlayerId,
    "Player"
);

identifier!(
    /// Identifier of a user identity, keyed by email address.
    UserId,
    "User"
);

identifier!(
    /// Identifier of a login session.
    SessionId,
    "Session"
);

identifier!(
    /// Identifier of a bank account.
    AccountId,
    "Account"
);

macro_rules! generated {
    ($($name:ident),+) => {
        $(
            impl $name {
                /// Creates a new identifier from a random UUID.
                pub fn generate() -> Self {
                    Self(Uuid::new_v4().to_string())
                }
            }
        )+
    };
}

generated!(GameId, PlayerId, SessionId, AccountId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_carries_kind_prefix() {
        let id = GameId::new("g1").unwrap();
        assert_eq!(id.to_string(), "Game:g1");
        assert_eq!(id.aggregate_id().as_str(), "Game:g1");
    }

    #[test]
    fn equality_is_by_canonical_value() {
        let a = AggregateId::new("Game", "g1");
        let b = GameId::new(String::from("g1")).unwrap().aggregate_id();
        assert_eq!(a, b);
    }

    #[test]
    fn different_kinds_never_collide() {
        let game = GameId::new("x").unwrap().aggregate_id();
        let player = PlayerId::new("x").unwrap().aggregate_id();
        assert_ne!(game, player);
    }

    #[test]
    fn kind_and_value_accessors() {
        let id = UserId::new("someone@example.com").unwrap().aggregate_id();
        assert_eq!(id.kind(), "User");
        assert_eq!(id.value(), "someone@example.com");
    }

    #[test]
    fn empty_user_id_is_rejected() {
        let err = UserId::new("").unwrap_err();
        assert_eq!(err.kind, "User");
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(GameId::generate(), GameId::generate());
    }

    #[test]
    fn serde_uses_raw_value_and_validates() {
        let id = PlayerId::new("p1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p1\"");

        let back: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<PlayerId>("\"\"").is_err());
    }
}
