//! Cooperative once-per-frame scheduling.
//!
//! The host owns a [`Ticker`] and calls [`Ticker::tick`] once per frame. Two
//! kinds of registrations are woken by a tick:
//!
//! - waker slots, used by [`ChangeStream`](crate::ChangeStream) to park a task
//!   until the next frame,
//! - callbacks, the plain "call me once per frame until cancelled" form used by
//!   hosts that do not run an executor.
//!
//! Registrations are released when their [`TickRegistration`] is dropped.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::task::Waker;

use tracing::trace;

use crate::CancellationToken;

type TickCallback = Rc<RefCell<dyn FnMut(u64)>>;

enum Slot {
    Waker(Option<Waker>),
    Callback {
        token: CancellationToken,
        callback: TickCallback,
    },
}

#[derive(Default)]
struct TickerInner {
    frame: u64,
    next_id: u64,
    slots: BTreeMap<u64, Slot>,
}

impl TickerInner {
    fn insert(&mut self, slot: Slot) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.insert(id, slot);
        id
    }
}

/// A single-threaded frame clock.
///
/// Cloning a `Ticker` yields another handle to the same clock.
#[derive(Clone, Default)]
pub struct Ticker {
    inner: Rc<RefCell<TickerInner>>,
}

impl Ticker {
    /// Creates a ticker at frame zero with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of ticks that have happened so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }

    /// Returns how many registrations are currently alive.
    #[must_use]
    pub fn registrations(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Advances the clock by one frame.
    ///
    /// Callbacks run first, in registration order, then every parked waker is
    /// woken. A callback whose token has been cancelled is removed instead of
    /// being invoked. Returns the new frame number.
    pub fn tick(&self) -> u64 {
        let (frame, wakers, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.frame += 1;
            let frame = inner.frame;

            let mut wakers = Vec::new();
            let mut callbacks = Vec::new();
            inner.slots.retain(|id, slot| match slot {
                Slot::Waker(waker) => {
                    wakers.extend(waker.take());
                    true
                }
                Slot::Callback { token, callback } => {
                    if token.is_cancelled() {
                        return false;
                    }
                    callbacks.push((*id, token.clone(), Rc::clone(callback)));
                    true
                }
            });
            (frame, wakers, callbacks)
        };

        trace!(
            target: "safeline::tick",
            frame,
            callbacks = callbacks.len(),
            wakers = wakers.len(),
            "tick"
        );

        for (id, token, callback) in callbacks {
            // An earlier callback may have stopped this one during the tick.
            if token.is_cancelled() {
                self.inner.borrow_mut().slots.remove(&id);
                continue;
            }
            if !self.inner.borrow().slots.contains_key(&id) {
                continue;
            }
            let mut callback = callback.borrow_mut();
            (&mut *callback)(frame);
        }

        for waker in wakers {
            waker.wake();
        }

        frame
    }

    /// Registers an empty waker slot.
    ///
    /// Park a task in it with [`TickRegistration::set_waker`]; the next tick
    /// wakes it.
    #[must_use]
    pub fn registration(&self) -> TickRegistration {
        let id = self.inner.borrow_mut().insert(Slot::Waker(None));
        TickRegistration {
            ticker: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Invokes `callback` with the frame number on every tick until `token` is
    /// cancelled or the returned registration is dropped.
    ///
    /// The callback is never invoked synchronously from this call; the first
    /// invocation happens on the next tick.
    #[must_use = "dropping the registration unregisters the callback"]
    pub fn on_tick(
        &self,
        token: &CancellationToken,
        callback: impl FnMut(u64) + 'static,
    ) -> TickRegistration {
        let callback: TickCallback = Rc::new(RefCell::new(callback));
        let id = self.inner.borrow_mut().insert(Slot::Callback {
            token: token.clone(),
            callback,
        });
        TickRegistration {
            ticker: Rc::downgrade(&self.inner),
            id,
        }
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Ticker")
            .field("frame", &inner.frame)
            .field("registrations", &inner.slots.len())
            .finish()
    }
}

/// Handle to a slot inside a [`Ticker`]. Dropping it unregisters the slot.
pub struct TickRegistration {
    ticker: Weak<RefCell<TickerInner>>,
    id: u64,
}

impl TickRegistration {
    /// Parks `waker` until the next tick.
    ///
    /// Does nothing for callback registrations or once the ticker is gone.
    pub fn set_waker(&self, waker: &Waker) {
        let Some(ticker) = self.ticker.upgrade() else {
            return;
        };
        let mut inner = ticker.borrow_mut();
        if let Some(Slot::Waker(slot)) = inner.slots.get_mut(&self.id) {
            match slot {
                Some(current) if current.will_wake(waker) => {}
                _ => *slot = Some(waker.clone()),
            }
        }
    }

    /// Returns `true` while the slot is still registered with a live ticker.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ticker
            .upgrade()
            .is_some_and(|ticker| ticker.borrow().slots.contains_key(&self.id))
    }
}

impl Drop for TickRegistration {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.upgrade() {
            ticker.borrow_mut().slots.remove(&self.id);
        }
    }
}

impl fmt::Debug for TickRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickRegistration")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
