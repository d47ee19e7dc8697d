//! Geometry primitives for safe-area rectangles and anchors.
//!
//! All comparisons are exact. A safe-area rectangle is a verbatim copy of what
//! the platform reported, so two polls describe the same area only when every
//! field is bit-for-bit equal.

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned rectangle in screen pixels.
///
/// Width and height are never negative; the constructors clamp them to zero,
/// and so does deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawRect"))]
pub struct Rect {
    origin: Point,
    size: Size,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRect {
    origin: Point,
    size: Size,
}

#[cfg(feature = "serde")]
impl From<RawRect> for Rect {
    fn from(raw: RawRect) -> Self {
        Self::new(raw.origin, raw.size)
    }
}

impl Rect {
    /// Creates a new [`Rect`] with the provided `origin` and `size`.
    #[must_use]
    pub const fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size: Size::new(size.width.max(0.0), size.height.max(0.0)),
        }
    }

    /// Creates a rectangle from its position and extent.
    #[must_use]
    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    /// Creates a rectangle from origin (0, 0) with the given size.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(Point::zero(), size)
    }

    /// Returns the rectangle's origin.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the rectangle's size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Returns the rectangle's width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.width
    }

    /// Returns the rectangle's height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.height
    }

    /// Returns the minimum x-coordinate (left edge).
    #[must_use]
    pub const fn min_x(&self) -> f32 {
        self.origin.x
    }

    /// Returns the minimum y-coordinate (bottom edge).
    #[must_use]
    pub const fn min_y(&self) -> f32 {
        self.origin.y
    }

    /// Returns the maximum x-coordinate (right edge).
    #[must_use]
    pub const fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Returns the maximum y-coordinate (top edge).
    #[must_use]
    pub const fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Returns true if the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.width == 0.0 || self.size.height == 0.0
    }
}

// ============================================================================
// Size
// ============================================================================

/// Two-dimensional size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// The width in pixels.
    pub width: f32,
    /// The height in pixels.
    pub height: f32,
}

impl Size {
    /// Constructs a [`Size`] with the given `width` and `height`.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Creates a [`Size`] with zero width and height.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

// ============================================================================
// Point
// ============================================================================

/// A position, either in pixels or in normalized anchor space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// The x-coordinate.
    pub x: f32,
    /// The y-coordinate.
    pub y: f32,
}

impl Point {
    /// Constructs a [`Point`] at the given `x` and `y`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a [`Point`] at the origin (0, 0).
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}
