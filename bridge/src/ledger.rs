//! Account ledger
//!
//! Records are stored under the address of the account that holds them. An
//! operation declares up front which accounts it reads and which it writes.
//! The ledger grants shared locks for reads and exclusive locks for writes,
//! all at once, then runs the operation against a [`Transaction`] overlay.
//! Staged writes reach the store only when the operation returns `Ok`, and
//! they become visible together.
//!
//! Operations over disjoint write sets run in parallel. Two operations that
//! write the same account are serialized.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use bridge_common::Address32;
use cosmwasm_std::{MemoryStorage, Order, Record, Storage};
use tracing::debug;

use crate::derivation::AccountHandle;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Access Sets
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Accounts an operation touches. Declaring an account twice keeps the
/// stronger access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessSet {
    accounts: BTreeMap<Address32, Access>,
}

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, account: &AccountHandle) -> Self {
        self.insert(account.address, Access::Read);
        self
    }

    pub fn write(mut self, account: &AccountHandle) -> Self {
        self.insert(account.address, Access::Write);
        self
    }

    fn insert(&mut self, address: Address32, access: Access) {
        let entry = self.accounts.entry(address).or_insert(access);
        if access == Access::Write {
            *entry = Access::Write;
        }
    }

    pub fn access(&self, address: &Address32) -> Option<Access> {
        self.accounts.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&Address32, &Access)> {
        self.accounts.iter()
    }

    /// Whether a storage key belongs to an account declared writable.
    /// Record keys end with the 32-byte account address.
    fn permits_write(&self, key: &[u8]) -> bool {
        if key.len() < 32 {
            return false;
        }
        Address32::from_slice(&key[key.len() - 32..])
            .map(|address| self.access(&address) == Some(Access::Write))
            .unwrap_or(false)
    }
}

// ============================================================================
// Lock Table
// ============================================================================

#[derive(Default)]
struct LockState {
    readers: usize,
    writer: bool,
}

#[derive(Default)]
struct LockTable {
    held: Mutex<HashMap<Address32, LockState>>,
    released: Condvar,
}

impl LockTable {
    fn available(held: &HashMap<Address32, LockState>, set: &AccessSet) -> bool {
        set.iter().all(|(address, access)| match held.get(address) {
            None => true,
            Some(state) => match access {
                Access::Read => !state.writer,
                Access::Write => !state.writer && state.readers == 0,
            },
        })
    }

    /// Block until every account in the set can be locked, then lock them
    /// all. Taking the whole set at once rules out lock-order deadlocks.
    fn acquire<'a>(&'a self, set: &'a AccessSet) -> HeldLocks<'a> {
        let mut held = lock(&self.held);
        while !Self::available(&held, set) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }

        for (address, access) in set.iter() {
            let state = held.entry(*address).or_default();
            match access {
                Access::Read => state.readers += 1,
                Access::Write => state.writer = true,
            }
        }

        HeldLocks { table: self, set }
    }

    fn release(&self, set: &AccessSet) {
        let mut held = lock(&self.held);
        for (address, access) in set.iter() {
            if let Some(state) = held.get_mut(address) {
                match access {
                    Access::Read => state.readers = state.readers.saturating_sub(1),
                    Access::Write => state.writer = false,
                }
                if state.readers == 0 && !state.writer {
                    held.remove(address);
                }
            }
        }
        drop(held);
        self.released.notify_all();
    }
}

/// Locks are released when this guard drops, including on panic.
struct HeldLocks<'a> {
    table: &'a LockTable,
    set: &'a AccessSet,
}

impl Drop for HeldLocks<'_> {
    fn drop(&mut self) {
        self.table.release(self.set);
    }
}

// ============================================================================
// Ledger
// ============================================================================

pub struct Ledger {
    store: Mutex<MemoryStorage>,
    locks: LockTable,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(MemoryStorage::new()),
            locks: LockTable::default(),
        }
    }

    /// Run `op` atomically over the declared accounts.
    ///
    /// The closure sees its own staged writes. If it returns `Err` nothing it
    /// wrote is kept.
    pub fn transact<T, E, F>(&self, access: &AccessSet, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Storage) -> Result<T, E>,
    {
        let _held = self.locks.acquire(access);
        let mut tx = Transaction {
            store: &self.store,
            access,
            pending: BTreeMap::new(),
        };

        match op(&mut tx) {
            Ok(value) => {
                let writes = tx.commit();
                debug!(accounts = access.len(), writes, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                debug!(
                    accounts = access.len(),
                    discarded = tx.pending.len(),
                    "transaction rolled back"
                );
                Err(err)
            }
        }
    }

    /// Read committed state. The closure observes a consistent snapshot.
    pub fn read<T>(&self, op: impl FnOnce(&dyn Storage) -> T) -> T {
        let store = lock(&self.store);
        op(&*store)
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// Write-buffering overlay over the committed store.
pub struct Transaction<'a> {
    store: &'a Mutex<MemoryStorage>,
    access: &'a AccessSet,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl Transaction<'_> {
    fn commit(self) -> usize {
        let count = self.pending.len();
        let mut store = lock(self.store);
        for (key, value) in self.pending {
            match value {
                Some(value) => store.set(&key, &value),
                None => store.remove(&key),
            }
        }
        count
    }
}

impl Storage for Transaction<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(staged) => staged.clone(),
            None => lock(self.store).get(key),
        }
    }

    fn range<'b>(
        &'b self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Box::new(std::iter::empty());
            }
        }

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = {
            let store = lock(self.store);
            let committed = store.range(start, end, Order::Ascending).collect();
            committed
        };

        let lower = start.map_or(Bound::Unbounded, |s| Bound::Included(s.to_vec()));
        let upper = end.map_or(Bound::Unbounded, |e| Bound::Excluded(e.to_vec()));
        for (key, staged) in self.pending.range((lower, upper)) {
            match staged {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        let records: Vec<Record> = merged.into_iter().collect();
        match order {
            Order::Ascending => Box::new(records.into_iter()),
            Order::Descending => Box::new(records.into_iter().rev()),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        debug_assert!(
            self.access.permits_write(key),
            "write to an account not declared writable"
        );
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
    }

    fn remove(&mut self, key: &[u8]) {
        debug_assert!(
            self.access.permits_write(key),
            "remove from an account not declared writable"
        );
        self.pending.insert(key.to_vec(), None);
    }
}
