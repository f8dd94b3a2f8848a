//! Per-month results cache keyed by `(scope, month)`.
//!
//! At most one fetch per key runs at a time; concurrent callers wait for the
//! leader and share its value. Every key carries a generation counter that
//! invalidation bumps. A fetch that finishes under an older generation is
//! thrown away and the leader fetches again, so the last request started wins
//! and nothing stale is ever stored.

use std::{
    collections::HashMap,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, trace};
use uuid::Uuid;

use crate::ledger::{CalendarMonth, Transaction, TransactionWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub scope: Uuid,
    pub month: CalendarMonth,
}

impl MonthKey {
    pub fn new(scope: Uuid, month: CalendarMonth) -> Self {
        Self { scope, month }
    }
}

enum SlotState<V> {
    Empty,
    Loading,
    Ready(Arc<V>),
}

struct Slot<V> {
    generation: u64,
    state: SlotState<V>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            generation: 0,
            state: SlotState::Empty,
        }
    }
}

pub struct MonthCache<V> {
    slots: Mutex<HashMap<MonthKey, Slot<V>>>,
    changed: Condvar,
}

impl<V> Default for MonthCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MonthCache<V> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MonthKey, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value for `key`, without fetching.
    pub fn get(&self, key: &MonthKey) -> Option<Arc<V>> {
        match self.lock().get(key).map(|slot| &slot.state) {
            Some(SlotState::Ready(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Returns the cached value for `key` or runs `fetch` to produce it.
    ///
    /// Callers arriving while another thread fetches the same key block until
    /// that fetch settles. A failed fetch caches nothing; its error goes to the
    /// caller that ran it and waiting callers retry.
    pub fn get_or_fetch<E>(
        &self,
        key: MonthKey,
        mut fetch: impl FnMut() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let mut slots = self.lock();
        let mut generation = loop {
            let slot = slots.entry(key).or_default();
            match slot.state {
                SlotState::Ready(ref value) => {
                    trace!(scope = %key.scope, month = %key.month, "month cache hit");
                    return Ok(Arc::clone(value));
                }
                SlotState::Empty => {
                    slot.state = SlotState::Loading;
                    break slot.generation;
                }
                SlotState::Loading => {}
            }
            slots = self
                .changed
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        };
        drop(slots);

        let mut flight = FlightGuard {
            cache: self,
            key,
            settled: false,
        };
        loop {
            let outcome = fetch();
            let mut slots = self.lock();
            let slot = slots.entry(key).or_default();
            if slot.generation != generation {
                debug!(
                    scope = %key.scope,
                    month = %key.month,
                    "discarding fetch superseded by invalidation"
                );
                generation = slot.generation;
                slot.state = SlotState::Loading;
                continue;
            }
            flight.settled = true;
            let result = match outcome {
                Ok(value) => {
                    let value = Arc::new(value);
                    slot.state = SlotState::Ready(Arc::clone(&value));
                    Ok(value)
                }
                Err(err) => {
                    slot.state = SlotState::Empty;
                    Err(err)
                }
            };
            self.changed.notify_all();
            return result;
        }
    }

    /// Drops the cached value for `key`; an in-flight fetch for it becomes stale.
    pub fn invalidate(&self, key: &MonthKey) {
        let mut slots = self.lock();
        Self::invalidate_locked(&mut slots, key);
    }

    fn invalidate_locked(slots: &mut HashMap<MonthKey, Slot<V>>, key: &MonthKey) {
        let in_flight = match slots.get_mut(key) {
            Some(slot) => {
                slot.generation += 1;
                matches!(slot.state, SlotState::Loading)
            }
            None => return,
        };
        if !in_flight {
            slots.remove(key);
        }
        trace!(scope = %key.scope, month = %key.month, in_flight, "month cache invalidated");
    }

    /// Invalidates every month cached for `scope`.
    pub fn invalidate_scope(&self, scope: Uuid) {
        self.invalidate_where(|key| key.scope == scope);
    }

    /// Invalidates every month of `scope` whose fetch window admits
    /// `transaction`. Call it with both versions of an updated row.
    pub fn invalidate_affected(&self, scope: Uuid, transaction: &Transaction, lookback_months: u32) {
        self.invalidate_where(|key| {
            key.scope == scope
                && TransactionWindow::new(key.month, lookback_months)
                    .map_or(true, |window| window.admits(transaction))
        });
    }

    fn invalidate_where(&self, mut predicate: impl FnMut(&MonthKey) -> bool) {
        let mut slots = self.lock();
        let keys: Vec<MonthKey> = slots.keys().filter(|key| predicate(key)).copied().collect();
        for key in &keys {
            Self::invalidate_locked(&mut slots, key);
        }
    }

    /// Months currently holding a value for `scope`.
    pub fn cached_months(&self, scope: Uuid) -> Vec<CalendarMonth> {
        let mut months: Vec<CalendarMonth> = self
            .lock()
            .iter()
            .filter(|(key, slot)| key.scope == scope && matches!(slot.state, SlotState::Ready(_)))
            .map(|(key, _)| key.month)
            .collect();
        months.sort();
        months
    }
}

/// Releases a `Loading` slot if the leader unwinds before settling it.
struct FlightGuard<'a, V> {
    cache: &'a MonthCache<V>,
    key: MonthKey,
    settled: bool,
}

impl<V> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut slots = self.cache.lock();
        if let Some(slot) = slots.get_mut(&self.key) {
            if matches!(slot.state, SlotState::Loading) {
                slot.state = SlotState::Empty;
            }
        }
        self.cache.changed.notify_all();
    }
}
