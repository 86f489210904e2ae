//! Observer registries attached to wrappers.
//!
//! A signal holds an ordered list of handlers. Emission runs over a snapshot
//! of the list, so a handler may connect or disconnect handlers (including
//! itself) without invalidating the emission in progress. A handler that is
//! already running further up the stack is skipped rather than re-entered.
//!
//! Handlers may be tagged with the [`ExtensionHandle`] of the sub-extension
//! that connected them. Tagged handlers are dropped when that sub-extension
//! is cleaned up, before its code module is released.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use modproxy_core::types::ExtensionHandle;

/// Identifies one connected handler within its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

struct Slot<F: ?Sized> {
    id: SlotId,
    owner: Option<ExtensionHandle>,
    handler: Rc<RefCell<F>>,
}

struct SlotList<F: ?Sized> {
    slots: RefCell<Vec<Slot<F>>>,
    next_id: Cell<u64>,
}

impl<F: ?Sized> SlotList<F> {
    fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    fn connect(&self, owner: Option<ExtensionHandle>, handler: Rc<RefCell<F>>) -> SlotId {
        let id = SlotId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().push(Slot { id, owner, handler });
        id
    }

    fn disconnect(&self, id: SlotId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        slots.len() != before
    }

    fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        // Dropped outside the borrow: a handler's captures may own other signals.
        let removed: Vec<Slot<F>> = {
            let mut slots = self.slots.borrow_mut();
            let (removed, kept): (Vec<Slot<F>>, Vec<Slot<F>>) = std::mem::take(&mut *slots)
                .into_iter()
                .partition(|slot| slot.owner == Some(owner));
            *slots = kept;
            removed
        };
        removed.len()
    }

    fn snapshot(&self) -> Vec<Rc<RefCell<F>>> {
        self.slots
            .borrow()
            .iter()
            .map(|slot| Rc::clone(&slot.handler))
            .collect()
    }

    fn len(&self) -> usize {
        self.slots.borrow().len()
    }
}

/// A signal whose handlers return nothing.
pub struct Signal<A> {
    slots: SlotList<dyn FnMut(&A)>,
}

impl<A> Signal<A> {
    /// Creates a signal with no handlers.
    pub fn new() -> Self {
        Self {
            slots: SlotList::new(),
        }
    }

    /// Connects a handler not owned by any sub-extension.
    pub fn connect(&self, handler: impl FnMut(&A) + 'static) -> SlotId {
        self.slots.connect(None, Rc::new(RefCell::new(handler)))
    }

    /// Connects a handler owned by the given sub-extension.
    pub fn connect_owned(
        &self,
        owner: ExtensionHandle,
        handler: impl FnMut(&A) + 'static,
    ) -> SlotId {
        self.slots.connect(Some(owner), Rc::new(RefCell::new(handler)))
    }

    /// Disconnects one handler. Returns whether it was connected.
    pub fn disconnect(&self, id: SlotId) -> bool {
        self.slots.disconnect(id)
    }

    /// Disconnects every handler owned by `owner`.
    pub fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        self.slots.disconnect_owner(owner)
    }

    /// Runs every handler in connection order. Returns how many ran.
    pub fn emit(&self, args: &A) -> usize {
        let mut ran = 0;
        for handler in self.slots.snapshot() {
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (&mut *handler)(args);
                ran += 1;
            }
        }
        ran
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.slots.len()
    }
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// A signal whose handlers report whether they handled the emission.
///
/// Every handler runs; the emission counts as handled if any handler
/// returned `true`.
pub struct HandledSignal<A> {
    slots: SlotList<dyn FnMut(&A) -> bool>,
}

impl<A> HandledSignal<A> {
    /// Creates a signal with no handlers.
    pub fn new() -> Self {
        Self {
            slots: SlotList::new(),
        }
    }

    /// Connects a handler not owned by any sub-extension.
    pub fn connect(&self, handler: impl FnMut(&A) -> bool + 'static) -> SlotId {
        self.slots.connect(None, Rc::new(RefCell::new(handler)))
    }

    /// Connects a handler owned by the given sub-extension.
    pub fn connect_owned(
        &self,
        owner: ExtensionHandle,
        handler: impl FnMut(&A) -> bool + 'static,
    ) -> SlotId {
        self.slots.connect(Some(owner), Rc::new(RefCell::new(handler)))
    }

    /// Disconnects one handler. Returns whether it was connected.
    pub fn disconnect(&self, id: SlotId) -> bool {
        self.slots.disconnect(id)
    }

    /// Disconnects every handler owned by `owner`.
    pub fn disconnect_owner(&self, owner: ExtensionHandle) -> usize {
        self.slots.disconnect_owner(owner)
    }

    /// Runs every handler in connection order.
    pub fn emit(&self, args: &A) -> bool {
        self.emit_counted(args).1
    }

    /// Like [`emit`](Self::emit), also returning how many handlers ran.
    /// Handlers already running further up the stack are skipped.
    pub fn emit_counted(&self, args: &A) -> (usize, bool) {
        let mut ran = 0;
        let mut handled = false;
        for handler in self.slots.snapshot() {
            if let Ok(mut handler) = handler.try_borrow_mut() {
                handled |= (&mut *handler)(args);
                ran += 1;
            }
        }
        (ran, handled)
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.slots.len()
    }
}

impl<A> Default for HandledSignal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for HandledSignal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandledSignal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_runs_handlers_in_order() {
        let signal = Signal::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        signal.connect(move |v| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        signal.connect(move |v| b.borrow_mut().push(("b", *v)));

        assert_eq!(signal.emit(&7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_disconnect() {
        let signal = Signal::<()>::new();
        let id = signal.connect(|_| {});
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        assert_eq!(signal.emit(&()), 0);
    }

    #[test]
    fn test_disconnect_owner_keeps_other_handlers() {
        let signal = Signal::<()>::new();
        let owner = ExtensionHandle(1);
        signal.connect_owned(owner, |_| {});
        signal.connect_owned(owner, |_| {});
        signal.connect_owned(ExtensionHandle(2), |_| {});
        signal.connect(|_| {});

        assert_eq!(signal.disconnect_owner(owner), 2);
        assert_eq!(signal.handler_count(), 2);
    }

    #[test]
    fn test_handler_may_connect_during_emit() {
        let signal = Rc::new(Signal::<()>::new());
        let inner = Rc::clone(&signal);
        signal.connect(move |_| {
            inner.connect(|_| {});
        });

        // The handler added during emission does not run in that emission.
        assert_eq!(signal.emit(&()), 1);
        assert_eq!(signal.handler_count(), 2);
    }

    #[test]
    fn test_handled_signal_any_true() {
        let signal = HandledSignal::<()>::new();
        assert!(!signal.emit(&()));

        signal.connect(|_| false);
        assert!(!signal.emit(&()));

        signal.connect(|_| true);
        signal.connect(|_| false);
        assert!(signal.emit(&()));
    }

    #[test]
    fn test_emit_counted_skips_running_handler() {
        let signal = Rc::new(HandledSignal::<u32>::new());
        let inner = Rc::new(RefCell::new(None));

        let reentry = Rc::clone(&signal);
        let seen = Rc::clone(&inner);
        signal.connect(move |depth| {
            if *depth == 0 {
                *seen.borrow_mut() = Some(reentry.emit_counted(&1));
            }
            false
        });
        signal.connect(|depth| *depth == 1);

        assert_eq!(signal.emit_counted(&0), (2, false));
        assert_eq!(*inner.borrow(), Some((1, true)));
        assert_eq!(signal.handler_count(), 2);
    }
}
