//! Strongly-typed identifiers.
//!
//! Both wrap a v4 UUID and serialise as its hyphenated string form, which is
//! the identifier format accepted on the wire.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub Uuid);

    impl $name {
      pub fn new() -> Self { Self(Uuid::new_v4()) }

      pub fn as_uuid(&self) -> Uuid { self.0 }
    }

    impl Default for $name {
      fn default() -> Self { Self::new() }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
      }
    }

    impl FromStr for $name {
      type Err = uuid::Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
      }
    }

    impl From<Uuid> for $name {
      fn from(id: Uuid) -> Self { Self(id) }
    }
  };
}

uuid_id!(
  /// Identifies a student record.
  StudentId
);

uuid_id!(
  /// Identifies a barangay (the geographic grouping of students).
  BarangayId
);
