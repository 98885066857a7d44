//! Property-based tests for serial number formatting.

use proptest::prelude::*;

use super::{SerialKind, prefix_from_name, serial_no};

/// Strategy over all serial kinds.
fn kind() -> impl Strategy<Value = SerialKind> {
    prop_oneof![
        Just(SerialKind::Budget),
        Just(SerialKind::Expense),
        Just(SerialKind::Invoice),
        Just(SerialKind::Payment),
    ]
}

proptest! {
    /// Formatting is deterministic: the same inputs always produce the
    /// identical string, so re-assigning a serial number is safe.
    #[test]
    fn prop_serial_is_idempotent(k in kind(), year in 2000i32..2100, id in 1i64..1_000_000) {
        prop_assert_eq!(serial_no(k, year, id), serial_no(k, year, id));
    }

    /// Every serial number matches `PRE-YY-NNNN` with at least four id
    /// digits.
    #[test]
    fn prop_serial_shape(k in kind(), year in 2000i32..2100, id in 1i64..1_000_000) {
        let serial = serial_no(k, year, id);
        let parts: Vec<&str> = serial.split('-').collect();
        prop_assert_eq!(parts.len(), 3);
        prop_assert_eq!(parts[0].len(), 3);
        prop_assert!(parts[0].chars().all(|c| c.is_ascii_uppercase()));
        prop_assert_eq!(parts[1].len(), 2);
        prop_assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        prop_assert!(parts[2].len() >= 4);
        prop_assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    /// The id survives the round trip through formatting.
    #[test]
    fn prop_id_round_trips(k in kind(), year in 2000i32..2100, id in 1i64..1_000_000) {
        let serial = serial_no(k, year, id);
        let digits = serial.rsplit('-').next().unwrap();
        prop_assert_eq!(digits.parse::<i64>().unwrap(), id);
    }

    /// Distinct kinds never share a prefix, so serials cannot collide
    /// across kinds.
    #[test]
    fn prop_prefixes_are_distinct(a in kind(), b in kind()) {
        if a != b {
            prop_assert_ne!(a.prefix(), b.prefix());
        }
    }

    /// Derived prefixes are always exactly three uppercase characters.
    #[test]
    fn prop_derived_prefix_is_three_chars(name in "[a-zA-Z]{0,12}") {
        let prefix = prefix_from_name(&name);
        prop_assert_eq!(prefix.chars().count(), 3);
        prop_assert!(prefix.chars().all(|c| c.is_ascii_uppercase()));
    }
}
