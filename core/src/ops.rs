//! Stateless operators for reshaping change streams.
//!
//! None of these deduplicate on their own except
//! [`distinct_until_changed`](ChangeStreamExt::distinct_until_changed). A
//! [`select`](ChangeStreamExt::select) that maps distinct inputs onto equal
//! outputs passes every output through; add a distinct stage explicitly when
//! that matters.

use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll, ready};

use futures::Stream;
use pin_project_lite::pin_project;

use crate::{CancellationToken, FirstWhere};

pin_project! {
    /// Stream returned by [`ChangeStreamExt::select`].
    #[must_use = "streams do nothing unless polled"]
    pub struct Select<S, F> {
        #[pin]
        stream: S,
        f: F,
    }
}

impl<S, F, U> Stream for Select<S, F>
where
    S: Stream,
    F: FnMut(S::Item) -> U,
{
    type Item = U;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<U>> {
        let this = self.project();
        this.stream.poll_next(cx).map(|item| item.map(this.f))
    }
}

impl<S: fmt::Debug, F> fmt::Debug for Select<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

pin_project! {
    /// Stream returned by [`ChangeStreamExt::select_some`].
    #[must_use = "streams do nothing unless polled"]
    pub struct SelectSome<S, F> {
        #[pin]
        stream: S,
        f: F,
    }
}

impl<S, F, U> Stream for SelectSome<S, F>
where
    S: Stream,
    F: FnMut(S::Item) -> Option<U>,
{
    type Item = U;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<U>> {
        let mut this = self.project();
        loop {
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            if let Some(mapped) = (this.f)(item) {
                return Poll::Ready(Some(mapped));
            }
        }
    }
}

impl<S: fmt::Debug, F> fmt::Debug for SelectSome<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectSome")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

pin_project! {
    /// Stream returned by [`ChangeStreamExt::keep_if`].
    #[must_use = "streams do nothing unless polled"]
    pub struct KeepIf<S, P> {
        #[pin]
        stream: S,
        predicate: P,
    }
}

impl<S, P> Stream for KeepIf<S, P>
where
    S: Stream,
    P: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let mut this = self.project();
        loop {
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            if (this.predicate)(&item) {
                return Poll::Ready(Some(item));
            }
        }
    }
}

impl<S: fmt::Debug, P> fmt::Debug for KeepIf<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeepIf")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

pin_project! {
    /// Stream returned by [`ChangeStreamExt::distinct_until_changed`] and
    /// [`ChangeStreamExt::distinct_until_changed_by`].
    #[must_use = "streams do nothing unless polled"]
    pub struct DistinctUntilChanged<S: Stream, E> {
        #[pin]
        stream: S,
        equals: E,
        last: Option<S::Item>,
    }
}

/// [`DistinctUntilChanged`] comparing with [`PartialEq`].
pub type Distinct<S> =
    DistinctUntilChanged<S, fn(&<S as Stream>::Item, &<S as Stream>::Item) -> bool>;

impl<S, E> Stream for DistinctUntilChanged<S, E>
where
    S: Stream,
    S::Item: Clone,
    E: FnMut(&S::Item, &S::Item) -> bool,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let mut this = self.project();
        loop {
            let Some(item) = ready!(this.stream.as_mut().poll_next(cx)) else {
                return Poll::Ready(None);
            };
            if let Some(last) = this.last.as_ref()
                && (this.equals)(last, &item)
            {
                continue;
            }
            *this.last = Some(item.clone());
            return Poll::Ready(Some(item));
        }
    }
}

impl<S, E> fmt::Debug for DistinctUntilChanged<S, E>
where
    S: Stream + fmt::Debug,
    S::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistinctUntilChanged")
            .field("stream", &self.stream)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

/// Operators available on every [`Stream`].
pub trait ChangeStreamExt: Stream {
    /// Maps every item through `f`. Equal outputs are not collapsed.
    fn select<U, F>(self, f: F) -> Select<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> U,
    {
        Select { stream: self, f }
    }

    /// Maps every item through `f` and drops the ones that map to `None`.
    fn select_some<U, F>(self, f: F) -> SelectSome<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> Option<U>,
    {
        SelectSome { stream: self, f }
    }

    /// Passes through only the items for which `predicate` holds.
    ///
    /// Dropped items leave no trace: downstream stages compare against the
    /// last item they actually received.
    fn keep_if<P>(self, predicate: P) -> KeepIf<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        KeepIf {
            stream: self,
            predicate,
        }
    }

    /// Collapses consecutive equal items.
    fn distinct_until_changed(self) -> Distinct<Self>
    where
        Self: Sized,
        Self::Item: PartialEq + Clone,
    {
        DistinctUntilChanged {
            stream: self,
            equals: <Self::Item as PartialEq>::eq,
            last: None,
        }
    }

    /// Collapses consecutive items for which `equals` holds.
    fn distinct_until_changed_by<E>(self, equals: E) -> DistinctUntilChanged<Self, E>
    where
        Self: Sized,
        Self::Item: Clone,
        E: FnMut(&Self::Item, &Self::Item) -> bool,
    {
        DistinctUntilChanged {
            stream: self,
            equals,
            last: None,
        }
    }

    /// Resolves with the first item satisfying `predicate`.
    ///
    /// See [`first_where`](crate::first_where).
    fn first_where<P>(self, predicate: P, token: &CancellationToken) -> FirstWhere<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        crate::first_where(self, predicate, token)
    }
}

impl<S: Stream + ?Sized> ChangeStreamExt for S {}
