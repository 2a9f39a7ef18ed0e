//! Signal/slot notifications from the host editor.
//!
//! A cooperative single-threaded reduction of the usual signal/slot
//! mechanism: slots are invoked directly on the emitting (UI) thread, and
//! connections can be held as RAII guards so a torn-down panel can never be
//! re-entered through a stale callback.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// The id remains valid until the connection is disconnected or the
    /// signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Rc<dyn Fn(&Args)>;

struct SignalShared<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: Cell<bool>,
}

/// A signal with any number of connected slots.
///
/// Emission invokes every connected slot directly, in the current thread.
/// Slots are cloned out of the connection table before invocation, so a
/// slot may connect or disconnect on the same signal while it runs.
pub struct Signal<Args> {
    shared: Rc<SignalShared<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(SignalShared {
                connections: Mutex::new(SlotMap::with_key()),
                blocked: Cell::new(false),
            }),
        }
    }

    /// Connect a slot. Returns an id for [`disconnect`](Self::disconnect).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + 'static,
    {
        self.shared.connections.lock().insert(Rc::new(slot))
    }

    /// Connect a slot and wrap the connection in an RAII guard that
    /// disconnects on drop.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + 'static,
    {
        ConnectionGuard {
            shared: Rc::downgrade(&self.shared),
            id: self.connect(slot),
        }
    }

    /// Disconnect a slot by id. Returns `true` if it was connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.shared.connections.lock().remove(id).is_some()
    }

    /// Disconnect every slot.
    pub fn disconnect_all(&self) {
        self.shared.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.shared.connections.lock().len()
    }

    /// Block or unblock emission. While blocked, `emit` does nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.shared.blocked.set(blocked);
    }

    /// Whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.shared.blocked.get()
    }

    /// Emit the signal, invoking all connected slots.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_composer_codepanel::signal", "signal blocked, skipping emit");
            return;
        }
        let slots: Vec<Slot<Args>> = self.shared.connections.lock().values().cloned().collect();
        for slot in slots {
            slot(&args);
        }
    }
}

/// RAII connection: disconnects its slot when dropped.
///
/// Holding guards for the panel's subscriptions ties callback lifetime to
/// panel lifetime; teardown drops the guards and the host can no longer
/// reach freed edit state.
pub struct ConnectionGuard<Args> {
    shared: Weak<SignalShared<Args>>,
    id: ConnectionId,
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.connections.lock().remove(self.id);
        }
    }
}

/// The host editor's subscription surface for the code panel.
///
/// The host emits `component_updated` synchronously after each of its own
/// tree mutations and `component_added` after inserting new nodes; the
/// panel connects at build time and releases its guards at teardown.
#[derive(Default)]
pub struct EditorEvents {
    /// A component in the tree changed.
    pub component_updated: Signal<()>,
    /// A component was added to the tree.
    pub component_added: Signal<()>,
}

impl EditorEvents {
    /// Create the event surface.
    pub fn new() -> Self {
        Self::default()
    }
}
