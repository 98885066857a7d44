//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BudgetUid` where an
//! `InvoiceUid` is expected. Every ledger entity is addressed externally by
//! its uid; the numeric primary key stays inside the database layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed uid wrappers.
macro_rules! typed_uid {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random uid using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates a uid from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_uid!(UserUid, "Unique identifier for a user.");
typed_uid!(DepartmentUid, "Unique identifier for a department.");
typed_uid!(CategoryUid, "Unique identifier for an expense category.");
typed_uid!(BudgetUid, "Unique identifier for a budget.");
typed_uid!(ExpenseUid, "Unique identifier for an expense.");
typed_uid!(InvoiceUid, "Unique identifier for an invoice.");
typed_uid!(PaymentUid, "Unique identifier for a payment.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_uids_are_unique() {
        assert_ne!(BudgetUid::new(), BudgetUid::new());
    }

    #[test]
    fn test_display_and_parse_roundtrip() {
        let uid = InvoiceUid::new();
        let parsed = InvoiceUid::from_str(&uid.to_string()).unwrap();
        assert_eq!(uid, parsed);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let raw = Uuid::new_v4();
        assert_eq!(PaymentUid::from_uuid(raw).into_inner(), raw);
        assert_eq!(PaymentUid::from(raw).0, raw);
    }

    #[test]
    fn test_serde_transparent() {
        let uid = DepartmentUid::new();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, format!("\"{}\"", uid.0));

        let back: DepartmentUid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }
}
