#![no_std]
//! Screen geometry and safe-area anchor math.
//!
//! This crate holds the plain data that flows through `safeline`:
//!
//! - geometry helpers ([`Point`], [`Size`], [`Rect`]),
//! - the polled screen snapshot ([`ScreenState`]) and its parts,
//! - the safe-area adjustment ([`AdjustConfig`], [`AnchorRect`],
//!   [`AnchorApplier`]) that maps a snapshot onto normalized anchors.
//!
//! # Coordinates
//!
//! Safe-area rectangles are expressed in pixels with the origin at the
//! bottom-left corner of the screen. Anchors are normalized so that `(0, 0)`
//! is the bottom-left and `(1, 1)` the top-right corner of the parent.
//!
//! # Example
//!
//! ```rust
//! use safeline_layout::{AdjustConfig, Orientation, Rect, Resolution, ScreenState, anchors_for};
//!
//! let state = ScreenState::new(
//!     Rect::from_xywh(20.0, 0.0, 600.0, 1000.0),
//!     Orientation::Portrait,
//!     Resolution::new(640, 1000),
//!     true,
//! );
//! let anchors = anchors_for(&state, &AdjustConfig::fit()).unwrap();
//! assert_eq!(anchors.min.x, 0.03125);
//! assert_eq!(anchors.max.x, 0.96875);
//! ```

pub mod geometry;
pub mod safe_area;
pub mod screen;

pub use geometry::{Point, Rect, Size};
pub use safe_area::{
    AdjustConfig, AnchorApplier, AnchorError, AnchorRect, EdgeBlanks, EdgeSet, anchors_for,
};
pub use screen::{Orientation, Resolution, ScreenInfo, ScreenState};
