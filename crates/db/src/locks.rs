//! Transaction-scoped advisory locks for ledger aggregates.
//!
//! Two expenses inserted into the same budget at once must not both
//! validate against the same stale remaining amount, and their recompute
//! steps must not race on the stored total. Every child mutation therefore
//! takes `pg_advisory_xact_lock` on the parent before reading its state;
//! `PostgreSQL` releases the lock automatically at commit or rollback.
//!
//! # Usage
//!
//! ```ignore
//! let txn = db.begin().await?;
//! locks::lock_aggregate(&txn, LockDomain::Budget, budget.id).await?;
//! // validate against fresh child rows, mutate, recompute
//! txn.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr};
use tracing::debug;

/// Ledger aggregate families sharing one advisory-lock keyspace.
///
/// The discriminant is folded into the high bits of the lock key so a
/// budget and an invoice with the same numeric id never contend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDomain {
    /// A budget row and its expenses.
    Budget = 1,
    /// An invoice row and its payments.
    Invoice = 2,
}

/// Low bits of the lock key reserved for the aggregate id.
const ID_BITS: u32 = 56;
const ID_MASK: i64 = (1_i64 << ID_BITS) - 1;

/// Builds the 64-bit advisory lock key for an aggregate.
#[must_use]
pub const fn lock_key(domain: LockDomain, aggregate_id: i64) -> i64 {
    ((domain as i64) << ID_BITS) | (aggregate_id & ID_MASK)
}

/// Takes the transaction-scoped advisory lock for an aggregate, blocking
/// until any current holder commits or rolls back.
///
/// # Errors
///
/// Returns an error if the lock statement fails.
pub async fn lock_aggregate(
    txn: &DatabaseTransaction,
    domain: LockDomain,
    aggregate_id: i64,
) -> Result<(), DbErr> {
    let key = lock_key(domain, aggregate_id);
    debug!(?domain, aggregate_id, key, "Acquiring aggregate lock");
    txn.execute_unprepared(&format!("SELECT pg_advisory_xact_lock({key})"))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_keys_distinct_across_domains() {
        assert_ne!(
            lock_key(LockDomain::Budget, 7),
            lock_key(LockDomain::Invoice, 7)
        );
    }

    #[test]
    fn test_lock_key_preserves_id_bits() {
        assert_eq!(lock_key(LockDomain::Budget, 42) & ID_MASK, 42);
        assert_eq!(lock_key(LockDomain::Invoice, 1) & ID_MASK, 1);
    }

    #[test]
    fn test_lock_key_stable_for_same_aggregate() {
        assert_eq!(
            lock_key(LockDomain::Invoice, 9001),
            lock_key(LockDomain::Invoice, 9001)
        );
    }

    #[test]
    fn test_lock_sql_format() {
        let key = lock_key(LockDomain::Budget, 3);
        let sql = format!("SELECT pg_advisory_xact_lock({key})");
        assert_eq!(
            sql,
            format!("SELECT pg_advisory_xact_lock({})", (1_i64 << 56) | 3)
        );
    }
}
