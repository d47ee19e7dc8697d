//! Named screen streams and waits.
//!
//! Every `observe_*` call builds a fresh subscription with its own token and
//! its own last-emitted slot. Nothing is shared between two calls, even when
//! they describe the same property.

use alloc::rc::Rc;
use core::fmt;
use core::future::Future;

use futures::Stream;
use safeline_core::{CancellationToken, Cancelled, ChangeStream, ChangeStreamExt, Ticker};
use safeline_layout::{Orientation, Rect, Resolution, ScreenInfo, ScreenState};

use crate::ScreenSource;

/// Factory of change streams over one [`ScreenSource`].
///
/// While the source reports itself as not ready, ticks are skipped without
/// touching any stream state.
#[derive(Clone)]
pub struct ScreenObserver {
    ticker: Ticker,
    source: Rc<dyn ScreenSource>,
}

impl ScreenObserver {
    /// Creates an observer polling `source` on every tick of `ticker`.
    #[must_use]
    pub fn new(ticker: &Ticker, source: Rc<dyn ScreenSource>) -> Self {
        Self {
            ticker: ticker.clone(),
            source,
        }
    }

    /// The ticker driving every stream of this observer.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// The polled source.
    #[must_use]
    pub fn source(&self) -> &Rc<dyn ScreenSource> {
        &self.source
    }

    /// Reads the screen right now, without subscribing.
    #[must_use]
    pub fn current_snapshot(&self) -> ScreenInfo {
        ScreenInfo {
            state: self.source.state(),
            is_mobile: self.source.is_mobile(),
        }
    }

    fn watch<T>(
        &self,
        token: &CancellationToken,
        read: impl Fn(&dyn ScreenSource) -> T + 'static,
    ) -> ChangeStream<T>
    where
        T: PartialEq + Clone + 'static,
    {
        let source = Rc::clone(&self.source);
        ChangeStream::try_new(
            &self.ticker,
            token,
            move || source.is_ready().then(|| read(&*source)),
            T::eq,
        )
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Every distinct full snapshot, focus included.
    pub fn observe_states(&self, token: &CancellationToken) -> ChangeStream<ScreenState> {
        self.watch(token, |source| source.state())
    }

    /// Distinct `(safe area, orientation)` pairs.
    pub fn observe_screen_changes(
        &self,
        token: &CancellationToken,
    ) -> ChangeStream<(Rect, Orientation)> {
        self.watch(token, |source| (source.safe_area(), source.orientation()))
    }

    /// Distinct safe areas.
    pub fn observe_safe_area(&self, token: &CancellationToken) -> ChangeStream<Rect> {
        self.watch(token, |source| source.safe_area())
    }

    /// Distinct orientations.
    pub fn observe_orientation(&self, token: &CancellationToken) -> ChangeStream<Orientation> {
        self.watch(token, |source| source.orientation())
    }

    /// Distinct resolutions, including invalid ones.
    pub fn observe_resolution(&self, token: &CancellationToken) -> ChangeStream<Resolution> {
        self.watch(token, |source| source.resolution())
    }

    /// Distinct aspect ratios. Invalid resolutions are skipped.
    ///
    /// Resolutions with the same ratio, such as 800x600 and 1600x1200,
    /// produce a single item.
    pub fn observe_aspect_ratio(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = f32> + Unpin + use<> {
        self.observe_resolution(token)
            .select_some(|resolution| resolution.aspect_ratio())
            .distinct_until_changed()
    }

    /// Whether the screen is in portrait, once per orientation change.
    ///
    /// Not deduplicated: going from portrait to portrait upside down yields
    /// `true` twice.
    pub fn observe_is_portrait(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = bool> + Unpin + use<> {
        self.observe_orientation(token).select(Orientation::is_portrait)
    }

    /// Whether the screen is in landscape, once per orientation change.
    pub fn observe_is_landscape(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = bool> + Unpin + use<> {
        self.observe_orientation(token).select(Orientation::is_landscape)
    }

    /// Top edge of the safe area relative to the screen height.
    ///
    /// Each ratio is computed from a single snapshot. Snapshots with an
    /// invalid resolution are skipped.
    pub fn observe_safe_area_top_ratio(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = f32> + Unpin + use<> {
        self.observe_states(token)
            .select_some(|state| state.safe_area_top_ratio())
            .distinct_until_changed()
    }

    /// Distinct focus changes. Only the focus flag is polled.
    pub fn observe_app_focus(&self, token: &CancellationToken) -> ChangeStream<bool> {
        self.watch(token, |source| source.is_focused())
    }

    /// `true` whenever the application gains focus, `false` when it loses it.
    pub fn observe_is_app_in_foreground(&self, token: &CancellationToken) -> ChangeStream<bool> {
        self.observe_app_focus(token)
    }

    /// The negation of [`observe_is_app_in_foreground`](Self::observe_is_app_in_foreground).
    pub fn observe_is_app_in_background(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = bool> + Unpin + use<> {
        self.observe_app_focus(token).select(|focused| !focused)
    }

    /// Safe-area changes that happen while the application has focus.
    ///
    /// Focus is read when the change is detected. A change made in the
    /// background is dropped and does not resurface on refocus.
    pub fn observe_safe_area_when_foreground(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = Rect> + Unpin + use<> {
        let source = Rc::clone(&self.source);
        self.observe_safe_area(token).keep_if(move |_| source.is_focused())
    }

    /// Orientation changes that happen while the application has focus.
    pub fn observe_orientation_when_foreground(
        &self,
        token: &CancellationToken,
    ) -> impl Stream<Item = Orientation> + Unpin + use<> {
        let source = Rc::clone(&self.source);
        self.observe_orientation(token).keep_if(move |_| source.is_focused())
    }

    // ========================================================================
    // Waits
    // ========================================================================

    /// Resolves once the screen is in portrait.
    ///
    /// Resolves on the first tick if it already is.
    pub fn wait_until_portrait(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<(), Cancelled>> + use<> {
        let wait = self
            .observe_is_portrait(token)
            .first_where(|portrait| *portrait, token);
        async move { wait.await.map(|_| ()) }
    }

    /// Resolves once the screen is in landscape.
    pub fn wait_until_landscape(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<(), Cancelled>> + use<> {
        let wait = self
            .observe_is_landscape(token)
            .first_where(|landscape| *landscape, token);
        async move { wait.await.map(|_| ()) }
    }

    /// Resolves with the first aspect ratio strictly above `threshold`.
    pub fn wait_until_aspect_ratio_greater_than(
        &self,
        threshold: f32,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<f32, Cancelled>> + use<> {
        self.observe_aspect_ratio(token)
            .first_where(move |ratio| *ratio > threshold, token)
    }

    /// Resolves once the application has focus.
    pub fn wait_until_app_foreground(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<(), Cancelled>> + use<> {
        let wait = self
            .observe_app_focus(token)
            .first_where(|focused| *focused, token);
        async move { wait.await.map(|_| ()) }
    }

    /// Resolves once the application has lost focus.
    pub fn wait_until_app_background(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<(), Cancelled>> + use<> {
        let wait = self
            .observe_app_focus(token)
            .first_where(|focused| !*focused, token);
        async move { wait.await.map(|_| ()) }
    }
}

impl fmt::Debug for ScreenObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenObserver")
            .field("ticker", &self.ticker)
            .field("snapshot", &self.current_snapshot())
            .finish()
    }
}
