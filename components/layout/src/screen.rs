//! The polled screen snapshot.

use crate::Rect;

/// Physical orientation reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Upright portrait.
    Portrait,
    /// Portrait, rotated by 180 degrees.
    PortraitUpsideDown,
    /// Landscape with the device rotated counter-clockwise.
    LandscapeLeft,
    /// Landscape with the device rotated clockwise.
    LandscapeRight,
    /// The platform picks the orientation from the sensor; no fixed value yet.
    #[default]
    AutoRotation,
}

impl Orientation {
    /// Returns true for both portrait variants.
    #[must_use]
    pub const fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait | Self::PortraitUpsideDown)
    }

    /// Returns true for both landscape variants.
    #[must_use]
    pub const fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}

/// Screen resolution in pixels.
///
/// Platforms briefly report zero or negative sizes during transitions such as
/// window minimization; [`is_valid`](Self::is_valid) tells those apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Resolution {
    /// Creates a resolution.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns true when both dimensions are positive.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width divided by height, or `None` for an invalid resolution.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> Option<f32> {
        self.is_valid()
            .then(|| self.width as f32 / self.height as f32)
    }
}

/// One poll of the screen signal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenState {
    /// Region not obstructed by notches, rounded corners or system bars.
    pub safe_area: Rect,
    /// Current orientation.
    pub orientation: Orientation,
    /// Current resolution.
    pub resolution: Resolution,
    /// Whether the application currently has focus.
    pub is_app_focused: bool,
}

impl ScreenState {
    /// Creates a snapshot from its parts.
    #[must_use]
    pub const fn new(
        safe_area: Rect,
        orientation: Orientation,
        resolution: Resolution,
        is_app_focused: bool,
    ) -> Self {
        Self {
            safe_area,
            orientation,
            resolution,
            is_app_focused,
        }
    }

    /// Top edge of the safe area as a fraction of the screen height, taken
    /// from this snapshot's own resolution.
    ///
    /// Returns `None` for an invalid resolution.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn safe_area_top_ratio(&self) -> Option<f32> {
        self.resolution
            .is_valid()
            .then(|| self.safe_area.max_y() / self.resolution.height as f32)
    }
}

/// A one-off screen snapshot with platform details.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenInfo {
    /// The polled screen state.
    pub state: ScreenState,
    /// Whether the application runs on a mobile platform.
    pub is_mobile: bool,
}

impl ScreenInfo {
    /// Width divided by height, or `None` for an invalid resolution.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f32> {
        self.state.resolution.aspect_ratio()
    }

    /// Returns true in either portrait orientation.
    #[must_use]
    pub const fn is_portrait(&self) -> bool {
        self.state.orientation.is_portrait()
    }

    /// Returns true in either landscape orientation.
    #[must_use]
    pub const fn is_landscape(&self) -> bool {
        self.state.orientation.is_landscape()
    }
}
