//! Safe-area anchoring.
//!
//! A full-screen container is shrunk to the safe area by setting its anchors
//! to the safe-area rectangle divided by the screen resolution. Each edge can
//! instead be *adjusted*: pulled back towards the screen edge by a blank
//! fraction, which lets backgrounds extend under a notch or home indicator
//! while content stays clear of it.
//!
//! # Formulas
//!
//! With `lerp(a, b, t) = a + (b - a) * t`:
//!
//! ```text
//! min.x = left   ? lerp(safe.min_x / w, 0, blank.left)   : safe.min_x / w
//! max.x = right  ? lerp(safe.max_x / w, 1, blank.right)  : safe.max_x / w
//! min.y = bottom ? lerp(safe.min_y / h, 0, blank.bottom) : safe.min_y / h
//! max.y = top    ? lerp(safe.max_y / h, -1, blank.top)   : safe.max_y / h
//! ```
//!
//! The top edge interpolates towards `-1`, not `1`; layouts tuned against
//! this behaviour rely on it.

use crate::{Point, ScreenState};

/// Specifies which edges are adjusted away from the safe area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EdgeSet {
    /// Adjust the top edge.
    pub top: bool,
    /// Adjust the bottom edge.
    pub bottom: bool,
    /// Adjust the left edge.
    pub left: bool,
    /// Adjust the right edge.
    pub right: bool,
}

impl EdgeSet {
    /// All edges.
    pub const ALL: Self = Self::new(true, true, true, true);

    /// No edges; the container follows the safe area exactly.
    pub const NONE: Self = Self::new(false, false, false, false);

    /// Left and right edges.
    pub const HORIZONTAL: Self = Self::new(false, false, true, true);

    /// Top and bottom edges.
    pub const VERTICAL: Self = Self::new(true, true, false, false);

    /// Top edge only.
    pub const TOP: Self = Self::new(true, false, false, false);

    /// Bottom edge only.
    pub const BOTTOM: Self = Self::new(false, true, false, false);

    /// Creates a custom edge set.
    #[must_use]
    pub const fn new(top: bool, bottom: bool, left: bool, right: bool) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Returns true if any edge is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }

    /// Returns true if every edge is set.
    #[must_use]
    pub const fn all(&self) -> bool {
        self.top && self.bottom && self.left && self.right
    }
}

/// Per-edge blank fractions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EdgeBlanks {
    /// Blank fraction for the top edge.
    pub top: f32,
    /// Blank fraction for the bottom edge.
    pub bottom: f32,
    /// Blank fraction for the left edge.
    pub left: f32,
    /// Blank fraction for the right edge.
    pub right: f32,
}

impl EdgeBlanks {
    /// No blank on any edge.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates blank fractions for each edge.
    #[must_use]
    pub const fn new(top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Returns the first edge whose fraction lies outside `[0, 1]`, with its
    /// value.
    #[must_use]
    pub fn out_of_range(&self) -> Option<(&'static str, f32)> {
        [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ]
        .into_iter()
        .find(|(_, value)| !(0.0..=1.0).contains(value))
    }
}

/// Adjustment applied to one anchored container.
///
/// Fixed at construction; a container that needs different settings is
/// attached again.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdjustConfig {
    /// Edges pulled back towards the screen edge.
    pub adjust: EdgeSet,
    /// How far each adjusted edge is pulled back.
    pub blank: EdgeBlanks,
}

impl AdjustConfig {
    /// Follows the safe area exactly on every edge.
    #[must_use]
    pub const fn fit() -> Self {
        Self {
            adjust: EdgeSet::NONE,
            blank: EdgeBlanks::ZERO,
        }
    }

    /// Adjusts `edges` by the matching fractions in `blank`.
    #[must_use]
    pub const fn extend(edges: EdgeSet, blank: EdgeBlanks) -> Self {
        Self {
            adjust: edges,
            blank,
        }
    }
}

/// Normalized anchors of a container inside its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorRect {
    /// Bottom-left anchor.
    pub min: Point,
    /// Top-right anchor.
    pub max: Point,
}

impl AnchorRect {
    /// Anchors covering the whole parent.
    pub const FULL: Self = Self::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));

    /// Creates anchors from their corners.
    #[must_use]
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }
}

impl Default for AnchorRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Errors produced while computing anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
    /// The screen reported a zero or negative dimension.
    #[error("invalid screen resolution {width}x{height}")]
    InvalidResolution {
        /// Reported width.
        width: i32,
        /// Reported height.
        height: i32,
    },
}

#[allow(clippy::suboptimal_flops)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Computes the anchors for `state` under `config`.
///
/// # Errors
///
/// Returns [`AnchorError::InvalidResolution`] when either dimension of the
/// resolution is not positive; no division happens in that case.
#[allow(clippy::cast_precision_loss)]
pub fn anchors_for(state: &ScreenState, config: &AdjustConfig) -> Result<AnchorRect, AnchorError> {
    let resolution = state.resolution;
    if !resolution.is_valid() {
        return Err(AnchorError::InvalidResolution {
            width: resolution.width,
            height: resolution.height,
        });
    }

    let width = resolution.width as f32;
    let height = resolution.height as f32;
    let safe = state.safe_area;
    let AdjustConfig { adjust, blank } = *config;

    let edge = |adjusted: bool, value: f32, target: f32, t: f32| {
        if adjusted { lerp(value, target, t) } else { value }
    };

    Ok(AnchorRect::new(
        Point::new(
            edge(adjust.left, safe.min_x() / width, 0.0, blank.left),
            edge(adjust.bottom, safe.min_y() / height, 0.0, blank.bottom),
        ),
        Point::new(
            edge(adjust.right, safe.max_x() / width, 1.0, blank.right),
            edge(adjust.top, safe.max_y() / height, -1.0, blank.top),
        ),
    ))
}

/// Keeps the anchors of one container in step with the screen.
///
/// The first valid snapshot always yields anchors, even when they equal the
/// full-parent default, so a container reattached after being moved is reset.
#[derive(Debug, Clone)]
pub struct AnchorApplier {
    config: AdjustConfig,
    current: Option<AnchorRect>,
}

impl AnchorApplier {
    /// Creates an applier that has not computed anything yet.
    #[must_use]
    pub const fn new(config: AdjustConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Returns the configuration this applier was built with.
    #[must_use]
    pub const fn config(&self) -> &AdjustConfig {
        &self.config
    }

    /// Returns the anchors computed last, or `None` before the first valid
    /// snapshot.
    #[must_use]
    pub const fn current(&self) -> Option<AnchorRect> {
        self.current
    }

    /// Recomputes the anchors for `state`.
    ///
    /// Returns the new anchors on the first valid snapshot and whenever they
    /// differ from the current ones. An invalid resolution keeps the current
    /// anchors.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::InvalidResolution`] when the snapshot was
    /// skipped. The applier stays usable.
    pub fn apply(&mut self, state: &ScreenState) -> Result<Option<AnchorRect>, AnchorError> {
        let anchors = anchors_for(state, &self.config)?;
        if self.current == Some(anchors) {
            return Ok(None);
        }
        self.current = Some(anchors);
        Ok(Some(anchors))
    }
}
