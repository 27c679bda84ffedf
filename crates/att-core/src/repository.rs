//! Storage seams: where punches come from and where attendance goes.
//!
//! The engine never talks to a database directly. Adapters (e.g. att-db)
//! implement these traits; use cases are generic over them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::NaiveDate;

use crate::attendance::Attendance;
use crate::punch::RawPunch;
use crate::types::{DateRange, EmployeeCode};

/// Called with the number of punches that just arrived for an employee.
pub type UpdateCallback = Box<dyn Fn(usize) + Send + Sync>;

/// Supplies raw punches.
///
/// Each call must read from a single consistent snapshot: a day's punches
/// are returned all together or not at all, never half of a batch that is
/// still being written.
pub trait PunchSource {
    type Punch: RawPunch + Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// All punches recorded for `code` on `date`, in storage order.
    fn punches_for_day(
        &self,
        code: &EmployeeCode,
        date: NaiveDate,
    ) -> Result<Vec<Self::Punch>, Self::Error>;

    /// Punches for every day in `range`, including days with none.
    ///
    /// The default issues one query per day; adapters that can read the
    /// whole range at once should override it.
    fn punches_for_range(
        &self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<Vec<(NaiveDate, Vec<Self::Punch>)>, Self::Error> {
        range
            .days()
            .map(|day| Ok((day, self.punches_for_day(code, day)?)))
            .collect()
    }

    /// Number of punches stored for `code` within `range`.
    fn punch_count(&self, code: &EmployeeCode, range: DateRange) -> Result<usize, Self::Error>;
}

/// Persists reconciled attendance.
pub trait AttendanceRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stored days for `code` within `range`, ordered by date.
    fn get_by_employee_code(
        &self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<Vec<Attendance>, Self::Error>;

    fn get_by_date(
        &self,
        code: &EmployeeCode,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, Self::Error>;

    /// Inserts or replaces the record for the attendance's employee and date.
    fn save(&mut self, attendance: &Attendance) -> Result<(), Self::Error>;

    /// Registers `callback` to hear about new punches for `code`.
    ///
    /// Delivery stops when the returned [`Subscription`] is dropped.
    fn subscribe_to_updates(&self, code: &EmployeeCode, callback: UpdateCallback) -> Subscription;
}

struct Subscriber {
    id: u64,
    code: EmployeeCode,
    callback: UpdateCallback,
}

type SubscriberList = Mutex<Vec<Subscriber>>;

/// A thread-safe registry of update callbacks, for adapters to embed.
#[derive(Clone, Default)]
pub struct Subscribers {
    inner: Arc<SubscriberList>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .finish()
    }
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, code: &EmployeeCode, callback: UpdateCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                code: code.clone(),
                callback,
            });
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invokes every callback registered for `code`. Zero counts are not sent.
    pub fn notify(&self, code: &EmployeeCode, count: usize) {
        if count == 0 {
            return;
        }
        let subscribers = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter().filter(|s| &s.code == code) {
            (subscriber.callback)(count);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for an update subscription. Dropping it unsubscribes.
#[derive(Debug)]
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberList>,
}

impl Subscription {
    /// A subscription attached to nothing, for sources that never push.
    pub const fn detached() -> Self {
        Self {
            id: u64::MAX,
            registry: Weak::new(),
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|s| s.id != self.id);
        }
    }
}
