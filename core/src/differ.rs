//! The change-detection core: a poll function, an equality rule and the last
//! value that was let through.

use alloc::boxed::Box;
use core::fmt;

/// Filters a polled signal down to its distinct transitions.
///
/// `Differ` does no scheduling of its own. Whoever drives it calls
/// [`sample`](Self::sample) once per tick and forwards whatever comes out.
pub struct Differ<T> {
    poll: Box<dyn FnMut() -> Option<T>>,
    equals: Box<dyn Fn(&T, &T) -> bool>,
    last: Option<T>,
}

impl<T: Clone + 'static> Differ<T> {
    /// Creates a differ over an always-available source.
    pub fn new(
        mut poll: impl FnMut() -> T + 'static,
        equals: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        Self::try_new(move || Some(poll()), equals)
    }

    /// Creates a differ over a source that may not be ready yet.
    ///
    /// A poll returning `None` produces no value and leaves the last emitted
    /// value untouched, so the next ready poll is compared against the last
    /// value that was actually let through.
    pub fn try_new(
        poll: impl FnMut() -> Option<T> + 'static,
        equals: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        Self {
            poll: Box::new(poll),
            equals: Box::new(equals),
            last: None,
        }
    }

    /// Polls the source once.
    ///
    /// Returns the polled value if nothing was emitted before or if it differs
    /// from the previous emission, and `None` otherwise.
    pub fn sample(&mut self) -> Option<T> {
        let current = (self.poll)()?;
        if let Some(last) = &self.last
            && (self.equals)(last, &current)
        {
            return None;
        }
        self.last = Some(current.clone());
        Some(current)
    }

    /// Returns the last value let through, if any.
    #[must_use]
    pub const fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

impl<T: PartialEq + Clone + 'static> Differ<T> {
    /// Creates a differ that compares with [`PartialEq`].
    pub fn distinct(poll: impl FnMut() -> T + 'static) -> Self {
        Self::new(poll, T::eq)
    }
}

impl<T: fmt::Debug> fmt::Debug for Differ<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Differ").field("last", &self.last).finish()
    }
}
