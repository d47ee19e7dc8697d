//! Attaching safe-area anchoring to containers.
//!
//! A [`SafeAreaHost`] owns one attachment per anchored container. Each
//! attachment samples the screen once per tick, recomputes the anchors when
//! the geometry changed and pushes them to its [`AnchorTarget`] only when
//! they actually moved.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::fmt;

use nami::{Binding, Signal};
use safeline_core::{CancellationToken, Differ, TickRegistration, Ticker};
use safeline_layout::{AdjustConfig, AnchorApplier, AnchorRect, ScreenState};
use tracing::{debug, info, trace};

use crate::{SafeAreaConfig, ScreenSource};

/// Receives the anchors of one container.
pub trait AnchorTarget {
    /// Stores new anchors. Called only when they changed.
    fn set_anchors(&self, anchors: AnchorRect);
}

impl AnchorTarget for Binding<AnchorRect> {
    fn set_anchors(&self, anchors: AnchorRect) {
        self.set(anchors);
    }
}

impl<T: AnchorTarget + ?Sized> AnchorTarget for Rc<T> {
    fn set_anchors(&self, anchors: AnchorRect) {
        (**self).set_anchors(anchors);
    }
}

/// Adapts a closure into an [`AnchorTarget`].
#[derive(Clone, Copy)]
pub struct AnchorFn<F>(pub F);

impl<F: Fn(AnchorRect)> AnchorTarget for AnchorFn<F> {
    fn set_anchors(&self, anchors: AnchorRect) {
        (self.0)(anchors);
    }
}

impl<F> fmt::Debug for AnchorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnchorFn").finish_non_exhaustive()
    }
}

/// Identifies an attachment inside a [`SafeAreaHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

struct Attachment {
    token: CancellationToken,
    anchors: Binding<AnchorRect>,
    _registration: TickRegistration,
}

/// Keeps anchored containers in step with the screen.
///
/// Dropping the host stops every attachment.
pub struct SafeAreaHost {
    ticker: Ticker,
    source: Rc<dyn ScreenSource>,
    token: CancellationToken,
    next_id: u64,
    attachments: BTreeMap<u64, Attachment>,
}

impl SafeAreaHost {
    /// Creates a host sampling `source` on every tick of `ticker`.
    #[must_use]
    pub fn new(ticker: &Ticker, source: Rc<dyn ScreenSource>) -> Self {
        Self {
            ticker: ticker.clone(),
            source,
            token: CancellationToken::new(),
            next_id: 0,
            attachments: BTreeMap::new(),
        }
    }

    /// Starts anchoring `target` under `config`.
    ///
    /// The first sample is taken on the next tick and is always pushed to
    /// `target`, even when it equals full-parent anchors. Until then the
    /// target is left untouched and [`anchors`](Self::anchors) reports
    /// full-parent anchors.
    pub fn start(&mut self, config: AdjustConfig, target: impl AnchorTarget + 'static) -> Handle {
        let id = self.next_id;
        self.next_id += 1;

        let token = self.token.child_token();
        let anchors = Binding::container(AnchorRect::FULL);

        let source = Rc::clone(&self.source);
        let mut differ = Differ::try_new(
            move || source.is_ready().then(|| source.state()),
            same_geometry,
        );
        let mut applier = AnchorApplier::new(config);
        let binding = anchors.clone();

        let registration = self.ticker.on_tick(&token, move |frame| {
            let Some(state) = differ.sample() else {
                return;
            };
            match applier.apply(&state) {
                Ok(Some(rect)) => {
                    trace!(target: "safeline::host", attachment = id, frame, ?rect, "anchors updated");
                    binding.set(rect);
                    target.set_anchors(rect);
                }
                Ok(None) => {}
                Err(error) => {
                    debug!(target: "safeline::host", attachment = id, frame, %error, "anchors kept");
                }
            }
        });

        info!(target: "safeline::host", attachment = id, ?config, "safe area attached");
        self.attachments.insert(
            id,
            Attachment {
                token,
                anchors,
                _registration: registration,
            },
        );
        Handle(id)
    }

    /// Starts anchoring `target` with loaded settings.
    ///
    /// Applies the configured log level before attaching.
    pub fn start_configured(
        &mut self,
        config: &SafeAreaConfig,
        target: impl AnchorTarget + 'static,
    ) -> Handle {
        config.apply_logging();
        self.start(config.adjust_config(), target)
    }

    /// Stops an attachment. Returns `false` if it was already stopped.
    pub fn stop(&mut self, handle: Handle) -> bool {
        let Some(attachment) = self.attachments.remove(&handle.0) else {
            return false;
        };
        attachment.token.cancel();
        info!(target: "safeline::host", attachment = handle.0, "safe area detached");
        true
    }

    /// Stops every attachment.
    pub fn stop_all(&mut self) {
        for (id, attachment) in core::mem::take(&mut self.attachments) {
            attachment.token.cancel();
            info!(target: "safeline::host", attachment = id, "safe area detached");
        }
    }

    /// The anchors last applied by an attachment.
    #[must_use]
    pub fn anchors(&self, handle: Handle) -> Option<AnchorRect> {
        self.attachments
            .get(&handle.0)
            .map(|attachment| attachment.anchors.get())
    }

    /// A reactive view of an attachment's anchors.
    #[must_use]
    pub fn binding(&self, handle: Handle) -> Option<Binding<AnchorRect>> {
        self.attachments
            .get(&handle.0)
            .map(|attachment| attachment.anchors.clone())
    }

    /// Returns `true` if `handle` is still attached.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.attachments.contains_key(&handle.0)
    }

    /// Number of live attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// Returns `true` when nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

impl Drop for SafeAreaHost {
    fn drop(&mut self) {
        self.stop_all();
        self.token.cancel();
    }
}

impl fmt::Debug for SafeAreaHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeAreaHost")
            .field("attachments", &self.attachments.keys().collect::<alloc::vec::Vec<_>>())
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

// Focus has no bearing on anchors.
fn same_geometry(a: &ScreenState, b: &ScreenState) -> bool {
    a.safe_area == b.safe_area && a.orientation == b.orientation && a.resolution == b.resolution
}
