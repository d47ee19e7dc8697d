//! Tick-driven change detection for polled external signals.
//!
//! A host calls [`Ticker::tick`] once per frame. Every [`ChangeStream`]
//! subscribed to that ticker polls its source at most once per tick and only
//! yields a value when it differs from the last value it yielded. Streams can
//! be reshaped with the operators in [`ChangeStreamExt`] and awaited with
//! [`first_where`].
//!
//! ```text
//! Ticker::tick ──▶ poll() ──▶ Differ ──▶ select / keep_if / distinct ──▶ consumer
//!                               │
//!                      last emitted value
//! ```
//!
//! # Invariants
//!
//! 1. The first poll of a subscription happens on the first tick after it was
//!    created, never synchronously at construction.
//! 2. A subscription emits iff the polled value differs from its previous
//!    emission (or nothing was emitted yet).
//! 3. Subscriptions never share state, even when they poll the same source.
//! 4. A cancelled [`CancellationToken`] stops polling and emission from the
//!    next tick on and releases the tick registration.
//!
//! Everything here is single-threaded: the types are built on `Rc` and are
//! driven from the thread that owns the [`Ticker`].

extern crate alloc;

pub mod cancel;
pub mod differ;
pub mod ops;
pub mod stream;
pub mod tick;
pub mod wait;

pub use cancel::{Cancelled, CancellationToken, WaitForCancellationFutureOwned};
pub use differ::Differ;
pub use ops::{ChangeStreamExt, Distinct, DistinctUntilChanged, KeepIf, Select, SelectSome};
pub use stream::ChangeStream;
pub use tick::{TickRegistration, Ticker};
pub use wait::{FirstWhere, first_where};
