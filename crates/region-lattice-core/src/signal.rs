//! Signal/slot system for Region Lattice.
//!
//! Regions emit a signal when their structure or names change, models emit
//! signals when their cache is rebuilt, and connected slots (callbacks) are
//! invoked in response.
//!
//! # Invocation
//!
//! Slots are always invoked synchronously, on the thread that calls
//! [`Signal::emit`], in connection order. The connection table is snapshotted
//! before any slot runs, so a slot may connect, disconnect, or emit on the
//! same signal without deadlocking. Slots connected during an emission are
//! first invoked by the next emission.
//!
//! # Example
//!
//! ```
//! use region_lattice_core::Signal;
//!
//! let renamed = Signal::<String>::new();
//! let id = renamed.connect(|name| println!("renamed to {name}"));
//!
//! renamed.emit("Heart".to_string());
//! assert!(renamed.disconnect(id));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one slot connected to a [`Signal`].
    ///
    /// Pass it to [`Signal::disconnect`]; after that it no longer resolves.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A signal that delivers `Args` to every connected slot.
///
/// Use a tuple such as `(Region, bool)` to pass several values.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Creates a signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connects a slot and returns the ID that disconnects it.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnects a slot.
    ///
    /// Returns `false` if `id` was not connected (or already disconnected).
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Invokes every connected slot with `args`.
    #[tracing::instrument(skip_all, target = "region_lattice_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        // Snapshot so slots may re-enter connect/disconnect/emit
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<(String, bool)>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_slots_invoked_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(tag));
        }

        assert_eq!(signal.connection_count(), 3);
        signal.emit(());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_reentrant_emit_does_not_deadlock() {
        let signal = Arc::new(Signal::<u32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let inner = signal.clone();
        let received_clone = received.clone();
        signal.connect(move |&depth| {
            received_clone.lock().push(depth);
            if depth < 3 {
                inner.emit(depth + 1);
            }
        });

        signal.emit(0);
        assert_eq!(*received.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_slot_disconnecting_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let count = Arc::new(Mutex::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let inner = signal.clone();
        let count_clone = count.clone();
        let id_clone = own_id.clone();
        let id = signal.connect(move |_| {
            *count_clone.lock() += 1;
            if let Some(id) = *id_clone.lock() {
                inner.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_connect_during_emit_applies_to_next_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let count = Arc::new(Mutex::new(0));

        let inner = signal.clone();
        let count_clone = count.clone();
        signal.connect(move |_| {
            let count = count_clone.clone();
            inner.connect(move |_| *count.lock() += 1);
        });

        signal.emit(());
        assert_eq!(*count.lock(), 0);
        signal.emit(());
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_signal_with_multiple_args() {
        let signal = Signal::<(String, bool)>::new();
        let received = Arc::new(Mutex::new(None));

        let received_clone = received.clone();
        signal.connect(move |args| {
            *received_clone.lock() = Some(args.clone());
        });

        signal.emit(("Heart".to_string(), true));

        assert_eq!(*received.lock(), Some(("Heart".to_string(), true)));
    }
}
