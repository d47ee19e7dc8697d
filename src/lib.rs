#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

extern crate alloc;

pub mod config;
mod error;
pub mod host;
pub mod logging;
pub mod observer;
pub mod source;

pub use error::{Error, Result};
pub use host::{AnchorFn, AnchorTarget, Handle, SafeAreaHost};
pub use observer::ScreenObserver;
pub use source::{ManualScreen, ScreenSource};

#[doc(inline)]
pub use config::SafeAreaConfig;
#[doc(inline)]
pub use safeline_core::{
    Cancelled, CancellationToken, ChangeStream, ChangeStreamExt, Differ, Ticker, first_where,
};
#[doc(inline)]
pub use safeline_layout::{
    AdjustConfig, AnchorApplier, AnchorError, AnchorRect, EdgeBlanks, EdgeSet, Orientation, Point,
    Rect, Resolution, ScreenInfo, ScreenState, Size, anchors_for,
};

#[doc(inline)]
pub use safeline_core as engine;
#[doc(inline)]
pub use safeline_layout as layout;

pub mod prelude {
    //! Commonly used types and traits in one import.
    //!
    //! ```rust
    //! use safeline::prelude::*;
    //! ```
    pub use super::{
        AdjustConfig, AnchorRect, CancellationToken, ChangeStreamExt, EdgeBlanks, EdgeSet,
        ManualScreen, Orientation, Rect, Resolution, SafeAreaHost, ScreenObserver, ScreenSource,
        ScreenState, Ticker,
    };
}

#[cfg(test)]
mod tests;
