//! The screen signal that observers poll.

use core::cell::Cell;
use core::fmt;

use safeline_layout::{Orientation, Rect, Resolution, ScreenState};

/// Platform provider of the raw screen signal.
///
/// Every method is a cheap, synchronous read of the current value; observers
/// call them at most once per tick.
pub trait ScreenSource {
    /// Region not obstructed by notches, rounded corners or system bars.
    fn safe_area(&self) -> Rect;

    /// Current orientation.
    fn orientation(&self) -> Orientation;

    /// Current resolution in pixels.
    fn resolution(&self) -> Resolution;

    /// Whether the application currently has focus.
    fn is_focused(&self) -> bool;

    /// Whether the application runs on a mobile platform.
    fn is_mobile(&self) -> bool {
        false
    }

    /// Whether the platform can answer yet.
    ///
    /// Sources that are unusable before the first frame has rendered return
    /// `false` until then; observers skip those ticks.
    fn is_ready(&self) -> bool {
        true
    }

    /// Reads the whole signal at once.
    fn state(&self) -> ScreenState {
        ScreenState::new(
            self.safe_area(),
            self.orientation(),
            self.resolution(),
            self.is_focused(),
        )
    }
}

/// A [`ScreenSource`] whose values are pushed by the host.
///
/// Suited to platforms that report screen changes through callbacks: the
/// callback stores the new value here and observers pick it up on the next
/// tick.
pub struct ManualScreen {
    state: Cell<ScreenState>,
    mobile: Cell<bool>,
    ready: Cell<bool>,
}

impl ManualScreen {
    /// Creates a ready source reporting `state`.
    #[must_use]
    pub fn new(state: ScreenState) -> Self {
        Self {
            state: Cell::new(state),
            mobile: Cell::new(false),
            ready: Cell::new(true),
        }
    }

    /// Creates a source that reports nothing until [`set_ready`](Self::set_ready).
    #[must_use]
    pub fn pending(state: ScreenState) -> Self {
        let screen = Self::new(state);
        screen.ready.set(false);
        screen
    }

    /// Replaces the whole snapshot.
    pub fn set_state(&self, state: ScreenState) {
        self.state.set(state);
    }

    /// Updates the safe area.
    pub fn set_safe_area(&self, safe_area: Rect) {
        self.update(|state| state.safe_area = safe_area);
    }

    /// Updates the orientation.
    pub fn set_orientation(&self, orientation: Orientation) {
        self.update(|state| state.orientation = orientation);
    }

    /// Updates the resolution.
    pub fn set_resolution(&self, resolution: Resolution) {
        self.update(|state| state.resolution = resolution);
    }

    /// Updates the focus flag.
    pub fn set_focused(&self, focused: bool) {
        self.update(|state| state.is_app_focused = focused);
    }

    /// Marks the platform as mobile or not.
    pub fn set_mobile(&self, mobile: bool) {
        self.mobile.set(mobile);
    }

    /// Marks the source as able to answer.
    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    fn update(&self, f: impl FnOnce(&mut ScreenState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
    }
}

impl ScreenSource for ManualScreen {
    fn safe_area(&self) -> Rect {
        self.state.get().safe_area
    }

    fn orientation(&self) -> Orientation {
        self.state.get().orientation
    }

    fn resolution(&self) -> Resolution {
        self.state.get().resolution
    }

    fn is_focused(&self) -> bool {
        self.state.get().is_app_focused
    }

    fn is_mobile(&self) -> bool {
        self.mobile.get()
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn state(&self) -> ScreenState {
        self.state.get()
    }
}

impl Default for ManualScreen {
    fn default() -> Self {
        Self::new(ScreenState::default())
    }
}

impl fmt::Debug for ManualScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScreen")
            .field("state", &self.state.get())
            .field("mobile", &self.mobile.get())
            .field("ready", &self.ready.get())
            .finish()
    }
}
