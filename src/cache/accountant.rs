//! Memory Accountant Module
//!
//! Coarse byte bookkeeping used only to decide whether a value may enter a cache.

use parking_lot::{Mutex, MutexGuard};

// == Size Estimation ==
/// Cheap, deterministic, order-of-magnitude cost of keeping a value cached.
///
/// Implementations must grow with the size of the value. Exactness is not
/// required.
pub trait EstimateSize {
    fn estimated_size(&self) -> u64;
}

/// Fixed cost charged for every cached entity.
pub const BASE_ENTRY_COST: u64 = 100;

/// Bytes charged per character of a string field.
pub const BYTES_PER_CHAR: u64 = 2;

/// Cost of a string field: two bytes per character.
pub fn string_cost(value: &str) -> u64 {
    value.chars().count() as u64 * BYTES_PER_CHAR
}

// == Memory Accountant ==
/// Running total of approximate bytes held by one cache instance.
#[derive(Debug)]
pub struct MemoryAccountant {
    ceiling: u64,
    used: Mutex<u64>,
}

impl MemoryAccountant {
    // == Constructor ==
    /// Creates an accountant with the given ceiling in bytes.
    pub fn new(ceiling: u64) -> Self {
        Self {
            ceiling,
            used: Mutex::new(0),
        }
    }

    /// Locks the running total for a compound check-and-record.
    ///
    /// Holding the returned [`Ledger`] is the single critical section for this
    /// accountant.
    pub fn lock(&self) -> Ledger<'_> {
        Ledger {
            ceiling: self.ceiling,
            used: self.used.lock(),
        }
    }

    // == Try Admit ==
    /// Returns whether `bytes` more would stay at or under the ceiling.
    ///
    /// Advisory only: nothing is recorded.
    pub fn try_admit(&self, bytes: u64) -> bool {
        self.lock().try_admit(bytes)
    }

    pub fn record_add(&self, bytes: u64) {
        self.lock().record_add(bytes);
    }

    /// Subtracts `bytes`, clamping the total at zero.
    pub fn record_remove(&self, bytes: u64) {
        self.lock().record_remove(bytes);
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn used(&self) -> u64 {
        *self.used.lock()
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }
}

// == Ledger ==
/// Exclusive view of an accountant's running total.
#[derive(Debug)]
pub struct Ledger<'a> {
    ceiling: u64,
    used: MutexGuard<'a, u64>,
}

impl Ledger<'_> {
    pub fn try_admit(&self, bytes: u64) -> bool {
        self.used
            .checked_add(bytes)
            .map_or(false, |total| total <= self.ceiling)
    }

    /// Admits `bytes` in place of `released` bytes already on the books.
    ///
    /// Records the swap and returns `true` when the resulting total stays under
    /// the ceiling; leaves the total untouched otherwise.
    pub fn try_replace(&mut self, released: u64, bytes: u64) -> bool {
        let remaining = self.used.saturating_sub(released);
        match remaining.checked_add(bytes) {
            Some(total) if total <= self.ceiling => {
                *self.used = total;
                true
            }
            _ => false,
        }
    }

    pub fn record_add(&mut self, bytes: u64) {
        *self.used = self.used.saturating_add(bytes);
    }

    pub fn record_remove(&mut self, bytes: u64) {
        *self.used = self.used.saturating_sub(bytes);
    }

    pub fn reset(&mut self) {
        *self.used = 0;
    }

    pub fn used(&self) -> u64 {
        *self.used
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accountant_is_empty() {
        let accountant = MemoryAccountant::new(1024);
        assert_eq!(accountant.used(), 0);
        assert_eq!(accountant.ceiling(), 1024);
    }

    #[test]
    fn test_try_admit_boundary() {
        let accountant = MemoryAccountant::new(1000);
        accountant.record_add(900);

        assert!(accountant.try_admit(100), "exactly at the ceiling is allowed");
        assert!(!accountant.try_admit(101));
        assert_eq!(accountant.used(), 900, "try_admit must not record");
    }

    #[test]
    fn test_try_admit_overflow_is_rejected() {
        let accountant = MemoryAccountant::new(u64::MAX);
        accountant.record_add(10);
        assert!(!accountant.try_admit(u64::MAX));
    }

    #[test]
    fn test_record_remove_clamps_at_zero() {
        let accountant = MemoryAccountant::new(1000);
        accountant.record_add(50);
        accountant.record_remove(80);
        assert_eq!(accountant.used(), 0);
    }

    #[test]
    fn test_reset() {
        let accountant = MemoryAccountant::new(1000);
        accountant.record_add(700);
        accountant.reset();
        assert_eq!(accountant.used(), 0);
    }

    #[test]
    fn test_try_replace_releases_old_bytes() {
        let accountant = MemoryAccountant::new(1000);
        accountant.record_add(900);

        let mut ledger = accountant.lock();
        // 900 - 300 + 400 = 1000
        assert!(ledger.try_replace(300, 400));
        assert_eq!(ledger.used(), 1000);
        assert!(!ledger.try_replace(0, 1));
        assert_eq!(ledger.used(), 1000);
    }

    #[test]
    fn test_string_cost_counts_chars() {
        assert_eq!(string_cost(""), 0);
        assert_eq!(string_cost("abc"), 6);
        assert_eq!(string_cost("борщ"), 8);
    }
}
