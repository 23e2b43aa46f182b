use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use filedrop_core::{Attachment, IngestError, MAX_FILES_PER_BATCH};
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    items: Vec<Attachment>,
    /// Slots claimed by in-flight ingestions but not yet filled.
    reserved: usize,
    /// Every id ever appended, so ids are never reused after remove or clear.
    issued: HashSet<String>,
}

impl Inner {
    fn remaining(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.items.len() + self.reserved)
    }

    /// Append the whole batch or nothing.
    fn append(&mut self, batch: Vec<Attachment>) -> Result<(), IngestError> {
        let mut incoming = HashSet::with_capacity(batch.len());
        for a in &batch {
            if self.issued.contains(a.id()) || !incoming.insert(a.id()) {
                return Err(IngestError::DuplicateId(a.id().to_string()));
            }
        }
        for a in batch {
            self.issued.insert(a.id().to_string());
            self.items.push(a);
        }
        Ok(())
    }
}

/// Ordered, capacity-bounded collection of attachments for one session.
///
/// Clones share the same collection. Every count check happens in the same
/// critical section as the mutation it guards, and ingestions that must
/// await between the two hold a [`Reservation`].
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
}

impl Default for AttachmentStore {
    fn default() -> Self {
        Self::new(MAX_FILES_PER_BATCH)
    }
}

impl AttachmentStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            capacity,
        }
    }

    // A panic while holding the lock cannot leave a half-applied mutation
    // behind, so the data is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `batch` if the result stays within capacity, otherwise leave
    /// the store untouched.
    pub fn add(&self, batch: Vec<Attachment>) -> Result<(), IngestError> {
        let mut inner = self.lock();
        let remaining = inner.remaining(self.capacity);
        if batch.len() > remaining {
            return Err(IngestError::BatchLimitExceeded {
                requested: batch.len(),
                remaining,
            });
        }
        inner.append(batch)
    }

    /// Claim `slots` of capacity ahead of asynchronous work.
    ///
    /// The claim lasts until the returned reservation is committed or dropped.
    pub fn reserve(&self, slots: usize) -> Result<Reservation, IngestError> {
        let mut inner = self.lock();
        let remaining = inner.remaining(self.capacity);
        if slots > remaining {
            return Err(IngestError::BatchLimitExceeded {
                requested: slots,
                remaining,
            });
        }
        inner.reserved += slots;
        debug!(slots, reserved = inner.reserved, "capacity reserved");
        Ok(Reservation {
            store: self.clone(),
            slots,
        })
    }

    /// Remove the attachment with `id`. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        self.lock().items.retain(|a| a.id() != id);
    }

    pub fn clear(&self) {
        self.lock().items.clear();
    }

    /// Snapshot of the attachments in acceptance order.
    pub fn list(&self) -> Vec<Attachment> {
        self.lock().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<Attachment> {
        self.lock().items.iter().find(|a| a.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots neither filled nor reserved.
    pub fn remaining(&self) -> usize {
        self.lock().remaining(self.capacity)
    }
}

/// Capacity claimed from an [`AttachmentStore`].
///
/// Unused slots go back to the store when the reservation is committed or
/// dropped.
#[derive(Debug)]
pub struct Reservation {
    store: AttachmentStore,
    slots: usize,
}

impl Reservation {
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Append `batch` into the reserved slots and release the reservation.
    ///
    /// Fails without touching the store if `batch` is larger than the
    /// reservation or carries an id the store has already seen.
    pub fn commit(mut self, batch: Vec<Attachment>) -> Result<(), IngestError> {
        let mut inner = self.store.lock();
        let slots = std::mem::take(&mut self.slots);
        inner.reserved -= slots;
        if batch.len() > slots {
            return Err(IngestError::BatchLimitExceeded {
                requested: batch.len(),
                remaining: slots,
            });
        }
        inner.append(batch)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.slots > 0 {
            let mut inner = self.store.lock();
            inner.reserved -= self.slots;
            debug!(slots = self.slots, "reservation released");
        }
    }
}
