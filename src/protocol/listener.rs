//! Purpose: Transaction lifecycle notifications for protocol client callers.
//! Exports: `TransactionEvent`, `TransactionListener`, `ListenerRegistration`.
//! Role: Explicit register/notify/unregister message passing owned by `ProtocolClient`.
//! Invariants: Removing a registration is idempotent and removes only that listener.
//! Invariants: Listeners run synchronously on the caller's thread, outside the registry lock.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::core::entity::TransactionId;
use crate::core::status::Status;
use crate::protocol::request::OperationKind;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransactionEvent {
    Submitted {
        kind: OperationKind,
        transaction_id: TransactionId,
    },
    /// `status` is absent when the failure happened before consensus reported one.
    Completed {
        kind: OperationKind,
        transaction_id: TransactionId,
        status: Option<Status>,
        succeeded: bool,
    },
}

impl TransactionEvent {
    pub fn kind(&self) -> OperationKind {
        match self {
            TransactionEvent::Submitted { kind, .. } | TransactionEvent::Completed { kind, .. } => {
                *kind
            }
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            TransactionEvent::Submitted { transaction_id, .. }
            | TransactionEvent::Completed { transaction_id, .. } => transaction_id,
        }
    }
}

/// Must be fast and must not panic; it runs inside `ProtocolClient::execute`.
pub trait TransactionListener: Send + Sync {
    fn on_event(&self, event: &TransactionEvent);
}

impl<F> TransactionListener for F
where
    F: Fn(&TransactionEvent) + Send + Sync,
{
    fn on_event(&self, event: &TransactionEvent) {
        self(event)
    }
}

type Entries = Vec<(u64, Arc<dyn TransactionListener>)>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Arc<Mutex<Entries>>,
}

impl ListenerRegistry {
    pub(crate) fn add(&self, listener: Arc<dyn TransactionListener>) -> ListenerRegistration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, listener));
        ListenerRegistration {
            id,
            entries: Arc::downgrade(&self.entries),
        }
    }

    pub(crate) fn notify(&self, event: &TransactionEvent) {
        let snapshot: Vec<Arc<dyn TransactionListener>> = lock(&self.entries)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener.on_event(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.entries).len()
    }
}

/// A poisoned lock only means a listener panicked mid-notify; the list itself is intact.
fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Returned by `ProtocolClient::add_listener`; `remove` unregisters that listener.
#[derive(Clone, Debug)]
pub struct ListenerRegistration {
    id: u64,
    entries: Weak<Mutex<Entries>>,
}

impl ListenerRegistration {
    /// Returns whether this call removed the listener. Later calls are no-ops.
    pub fn remove(&self) -> bool {
        let Some(entries) = self.entries.upgrade() else {
            return false;
        };
        let mut entries = lock(&entries);
        let before = entries.len();
        entries.retain(|(id, _)| *id != self.id);
        entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::AccountId;
    use time::OffsetDateTime;

    fn event() -> TransactionEvent {
        TransactionEvent::Submitted {
            kind: OperationKind::TopicCreate,
            transaction_id: TransactionId::new(AccountId::from_num(2), OffsetDateTime::UNIX_EPOCH),
        }
    }

    fn counter() -> (Arc<AtomicU64>, Arc<dyn TransactionListener>) {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);
        let listener = move |_: &TransactionEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        };
        (count, Arc::new(listener))
    }

    #[test]
    fn removal_is_idempotent_and_targeted() {
        let registry = ListenerRegistry::default();
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        let first_registration = registry.add(first);
        let _second_registration = registry.add(second);

        registry.notify(&event());
        assert!(first_registration.remove());
        assert!(!first_registration.remove());
        registry.notify(&event());

        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_listener_registered_twice_is_removed_once_per_registration() {
        let registry = ListenerRegistry::default();
        let (count, listener) = counter();
        let a = registry.add(Arc::clone(&listener));
        let _b = registry.add(listener);
        a.remove();
        registry.notify(&event());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removal_after_registry_drop_is_a_no_op() {
        let registry = ListenerRegistry::default();
        let (_, listener) = counter();
        let registration = registry.add(listener);
        drop(registry);
        assert!(!registration.remove());
    }
}
