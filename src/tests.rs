//! Observer and host behaviour against a manually driven screen.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use futures::{Stream, StreamExt};
use nami::{Binding, Signal};

use crate::{
    AdjustConfig, AnchorFn, AnchorRect, Cancelled, CancellationToken, EdgeBlanks, EdgeSet,
    ManualScreen, Orientation, Point, Rect, Resolution, SafeAreaConfig, SafeAreaHost,
    ScreenObserver, ScreenState, Ticker,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn portrait_phone() -> ScreenState {
    ScreenState::new(
        Rect::from_xywh(20.0, 0.0, 600.0, 1000.0),
        Orientation::Portrait,
        Resolution::new(640, 1000),
        true,
    )
}

fn landscape_monitor() -> ScreenState {
    ScreenState::new(
        Rect::from_xywh(0.0, 0.0, 800.0, 600.0),
        Orientation::LandscapeLeft,
        Resolution::new(800, 600),
        true,
    )
}

/// A screen, an observer over it and a local executor drained after every
/// tick.
struct Harness {
    ticker: Ticker,
    screen: Rc<ManualScreen>,
    observer: ScreenObserver,
    pool: LocalPool,
}

impl Harness {
    fn new(screen: ManualScreen) -> Self {
        let ticker = Ticker::new();
        let screen = Rc::new(screen);
        let observer = ScreenObserver::new(&ticker, screen.clone());
        Self {
            ticker,
            screen,
            observer,
            pool: LocalPool::new(),
        }
    }

    fn with_state(state: ScreenState) -> Self {
        Self::new(ManualScreen::new(state))
    }

    fn collect<S>(&mut self, stream: S) -> Rc<RefCell<Vec<S::Item>>>
    where
        S: Stream + Unpin + 'static,
        S::Item: 'static,
    {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut stream = stream;
        self.pool
            .spawner()
            .spawn_local(async move {
                while let Some(item) = stream.next().await {
                    sink.borrow_mut().push(item);
                }
            })
            .expect("spawn collector");
        self.pool.run_until_stalled();
        seen
    }

    fn resolve<F>(&mut self, future: F) -> Rc<RefCell<Option<F::Output>>>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let slot = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&slot);
        self.pool
            .spawner()
            .spawn_local(async move {
                *sink.borrow_mut() = Some(future.await);
            })
            .expect("spawn waiter");
        self.pool.run_until_stalled();
        slot
    }

    fn step(&mut self) {
        self.ticker.tick();
        self.pool.run_until_stalled();
    }

    /// Applies each change in turn, ticking once after every one.
    fn script(&mut self, changes: &[&dyn Fn(&ManualScreen)]) {
        for change in changes {
            change(&self.screen);
            self.step();
        }
    }
}

/// An anchor target that records every push.
fn recorder() -> (Rc<RefCell<Vec<AnchorRect>>>, AnchorFn<impl Fn(AnchorRect)>) {
    let pushes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pushes);
    (pushes, AnchorFn(move |anchors| sink.borrow_mut().push(anchors)))
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn current_snapshot_reads_without_subscribing() {
    let harness = Harness::with_state(portrait_phone());
    harness.screen.set_mobile(true);

    let info = harness.observer.current_snapshot();
    assert_eq!(info.state, portrait_phone());
    assert!(info.is_mobile);
    assert!(info.is_portrait());
    assert_eq!(harness.ticker.registrations(), 0);
}

// ============================================================================
// Streams
// ============================================================================

#[test]
fn safe_area_stream_emits_distinct_areas() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();
    let notch = Rect::from_xywh(0.0, 0.0, 640.0, 960.0);

    let seen = harness.collect(harness.observer.observe_safe_area(&token));
    assert!(seen.borrow().is_empty());

    harness.step();
    harness.script(&[
        &|screen: &ManualScreen| screen.set_focused(false),
        &|screen: &ManualScreen| screen.set_safe_area(notch),
        &|screen: &ManualScreen| screen.set_safe_area(notch),
    ]);

    assert_eq!(&*seen.borrow(), &[portrait_phone().safe_area, notch]);
}

#[test]
fn screen_changes_pair_safe_area_with_orientation() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();
    let safe_area = portrait_phone().safe_area;

    let seen = harness.collect(harness.observer.observe_screen_changes(&token));
    harness.step();
    harness.script(&[
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1280, 2000)),
        &|screen: &ManualScreen| screen.set_orientation(Orientation::PortraitUpsideDown),
    ]);

    assert_eq!(
        &*seen.borrow(),
        &[
            (safe_area, Orientation::Portrait),
            (safe_area, Orientation::PortraitUpsideDown),
        ]
    );
}

#[test]
fn aspect_ratio_skips_equal_ratios_and_invalid_resolutions() {
    let mut harness = Harness::with_state(landscape_monitor());
    let token = CancellationToken::new();

    let seen = harness.collect(harness.observer.observe_aspect_ratio(&token));
    harness.script(&[
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(800, 600)),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1600, 1200)),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(0, 600)),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1024, 768)),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1920, 1080)),
    ]);

    assert_eq!(&*seen.borrow(), &[800.0 / 600.0, 1920.0 / 1080.0]);
}

#[test]
fn orientation_flags_are_not_deduplicated() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();

    let portrait = harness.collect(harness.observer.observe_is_portrait(&token));
    let landscape = harness.collect(harness.observer.observe_is_landscape(&token));
    harness.step();
    harness.script(&[
        &|screen: &ManualScreen| screen.set_orientation(Orientation::PortraitUpsideDown),
        &|screen: &ManualScreen| screen.set_orientation(Orientation::LandscapeRight),
        &|screen: &ManualScreen| screen.set_orientation(Orientation::AutoRotation),
    ]);

    assert_eq!(&*portrait.borrow(), &[true, true, false, false]);
    assert_eq!(&*landscape.borrow(), &[false, false, true, false]);
}

#[test]
fn top_ratio_uses_the_same_snapshot() {
    let mut harness = Harness::with_state(ScreenState::new(
        Rect::from_xywh(0.0, 100.0, 1000.0, 350.0),
        Orientation::LandscapeLeft,
        Resolution::new(1000, 500),
        true,
    ));
    let token = CancellationToken::new();

    let seen = harness.collect(harness.observer.observe_safe_area_top_ratio(&token));
    harness.step();
    harness.script(&[
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1000, 0)),
        &|screen: &ManualScreen| screen.set_focused(false),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1000, 900)),
    ]);

    assert_eq!(&*seen.borrow(), &[0.9, 0.5]);
}

#[test]
fn focus_streams_track_foreground_and_background() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();

    let foreground = harness.collect(harness.observer.observe_is_app_in_foreground(&token));
    let background = harness.collect(harness.observer.observe_is_app_in_background(&token));
    harness.step();
    harness.script(&[
        &|screen: &ManualScreen| screen.set_focused(true),
        &|screen: &ManualScreen| screen.set_safe_area(Rect::from_xywh(0.0, 0.0, 10.0, 10.0)),
        &|screen: &ManualScreen| screen.set_focused(false),
        &|screen: &ManualScreen| screen.set_focused(true),
    ]);

    assert_eq!(&*foreground.borrow(), &[true, false, true]);
    assert_eq!(&*background.borrow(), &[false, true, false]);
}

#[test]
fn background_changes_are_dropped_from_foreground_streams() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();
    let hidden = Rect::from_xywh(0.0, 0.0, 640.0, 900.0);
    let visible = Rect::from_xywh(0.0, 40.0, 640.0, 900.0);

    let areas = harness.collect(harness.observer.observe_safe_area_when_foreground(&token));
    let orientations =
        harness.collect(harness.observer.observe_orientation_when_foreground(&token));
    harness.step();
    harness.script(&[
        &|screen: &ManualScreen| {
            screen.set_focused(false);
            screen.set_safe_area(hidden);
            screen.set_orientation(Orientation::LandscapeLeft);
        },
        // Refocusing alone changes neither value.
        &|screen: &ManualScreen| screen.set_focused(true),
        &|screen: &ManualScreen| screen.set_safe_area(visible),
    ]);

    assert_eq!(&*areas.borrow(), &[portrait_phone().safe_area, visible]);
    assert_eq!(&*orientations.borrow(), &[Orientation::Portrait]);
}

#[test]
fn pending_source_is_not_polled_until_ready() {
    let mut harness = Harness::new(ManualScreen::pending(portrait_phone()));
    let token = CancellationToken::new();

    let seen = harness.collect(harness.observer.observe_orientation(&token));
    harness.step();
    harness.step();
    assert!(seen.borrow().is_empty());

    harness.screen.set_ready(true);
    harness.step();
    assert_eq!(&*seen.borrow(), &[Orientation::Portrait]);
}

#[test]
fn observer_streams_are_independent() {
    let mut harness = Harness::with_state(portrait_phone());
    let first_token = CancellationToken::new();
    let second_token = CancellationToken::new();

    let first = harness.collect(harness.observer.observe_orientation(&first_token));
    harness.step();
    let second = harness.collect(harness.observer.observe_orientation(&second_token));

    first_token.cancel();
    harness.script(&[&|screen: &ManualScreen| screen.set_orientation(Orientation::LandscapeLeft)]);

    assert_eq!(&*first.borrow(), &[Orientation::Portrait]);
    assert_eq!(&*second.borrow(), &[Orientation::LandscapeLeft]);
    assert_eq!(harness.ticker.registrations(), 1);
}

// ============================================================================
// Waits
// ============================================================================

#[test]
fn portrait_wait_resolves_on_first_tick() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();

    let result = harness.resolve(harness.observer.wait_until_portrait(&token));
    assert!(result.borrow().is_none());

    harness.step();
    assert_eq!(*result.borrow(), Some(Ok(())));
    assert_eq!(harness.ticker.registrations(), 0);
}

#[test]
fn landscape_wait_resolves_after_rotation() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();

    let result = harness.resolve(harness.observer.wait_until_landscape(&token));
    harness.step();
    assert!(result.borrow().is_none());

    harness.script(&[&|screen: &ManualScreen| screen.set_orientation(Orientation::LandscapeRight)]);
    assert_eq!(*result.borrow(), Some(Ok(())));
}

#[test]
fn aspect_ratio_wait_returns_the_matching_ratio() {
    let mut harness = Harness::with_state(landscape_monitor());
    let token = CancellationToken::new();

    let result =
        harness.resolve(harness.observer.wait_until_aspect_ratio_greater_than(1.5, &token));
    harness.script(&[
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1600, 1200)),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(1920, 1080)),
        &|screen: &ManualScreen| screen.set_resolution(Resolution::new(2560, 1080)),
    ]);

    assert_eq!(*result.borrow(), Some(Ok(1920.0 / 1080.0)));
}

#[test]
fn focus_waits_follow_the_focus_flag() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();

    let background = harness.resolve(harness.observer.wait_until_app_background(&token));
    let foreground = harness.resolve(harness.observer.wait_until_app_foreground(&token));
    harness.step();
    assert_eq!(*foreground.borrow(), Some(Ok(())));
    assert!(background.borrow().is_none());

    harness.script(&[&|screen: &ManualScreen| screen.set_focused(false)]);
    assert_eq!(*background.borrow(), Some(Ok(())));
}

#[test]
fn cancelled_wait_reports_cancelled() {
    let mut harness = Harness::with_state(portrait_phone());
    let token = CancellationToken::new();

    let result = harness.resolve(harness.observer.wait_until_landscape(&token));
    harness.step();

    token.cancel();
    harness.pool.run_until_stalled();
    assert_eq!(*result.borrow(), Some(Err(Cancelled)));

    harness.script(&[&|screen: &ManualScreen| screen.set_orientation(Orientation::LandscapeLeft)]);
    assert_eq!(*result.borrow(), Some(Err(Cancelled)));
    assert_eq!(harness.ticker.registrations(), 0);
}

// ============================================================================
// SafeAreaHost
// ============================================================================

#[test]
fn host_applies_anchors_on_first_tick() {
    let harness = Harness::with_state(portrait_phone());
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let (pushes, target) = recorder();

    let handle = host.start(AdjustConfig::fit(), target);
    assert_eq!(host.anchors(handle), Some(AnchorRect::FULL));
    assert!(pushes.borrow().is_empty());

    harness.ticker.tick();
    let expected = AnchorRect::new(Point::new(0.03125, 0.0), Point::new(0.96875, 1.0));
    assert_eq!(&*pushes.borrow(), &[expected]);
    assert_eq!(host.anchors(handle), Some(expected));
    assert_eq!(host.binding(handle).map(|binding| binding.get()), Some(expected));
}

#[test]
fn host_pushes_once_per_distinct_anchor_change() {
    let harness = Harness::with_state(portrait_phone());
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let (pushes, target) = recorder();
    let _handle = host.start(AdjustConfig::fit(), target);

    harness.ticker.tick();
    harness.ticker.tick();
    harness.screen.set_focused(false);
    harness.ticker.tick();
    // Same anchors at twice the resolution.
    harness.screen.set_state(ScreenState::new(
        Rect::from_xywh(40.0, 0.0, 1200.0, 2000.0),
        Orientation::Portrait,
        Resolution::new(1280, 2000),
        false,
    ));
    harness.ticker.tick();
    assert_eq!(pushes.borrow().len(), 1);

    harness.screen.set_safe_area(Rect::from_xywh(0.0, 0.0, 1280.0, 1000.0));
    harness.ticker.tick();
    assert_eq!(pushes.borrow().len(), 2);
    assert_eq!(
        pushes.borrow()[1],
        AnchorRect::new(Point::new(0.0, 0.0), Point::new(1.0, 0.5))
    );
}

#[test]
fn host_keeps_anchors_on_zero_resolution() {
    let harness = Harness::with_state(portrait_phone());
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let (pushes, target) = recorder();
    let handle = host.start(AdjustConfig::fit(), target);

    harness.ticker.tick();
    let before = host.anchors(handle);

    harness.screen.set_resolution(Resolution::new(0, 0));
    harness.ticker.tick();
    assert_eq!(host.anchors(handle), before);
    assert_eq!(pushes.borrow().len(), 1);

    // Coming back to the same geometry does not push again.
    harness.screen.set_resolution(Resolution::new(640, 1000));
    harness.ticker.tick();
    assert_eq!(pushes.borrow().len(), 1);
}

#[test]
fn host_attachments_are_independent() {
    let harness = Harness::with_state(ScreenState::new(
        Rect::from_xywh(0.0, 100.0, 1000.0, 350.0),
        Orientation::LandscapeLeft,
        Resolution::new(1000, 500),
        true,
    ));
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let fit = host.start(AdjustConfig::fit(), AnchorFn(|_| {}));
    let extended = host.start(
        AdjustConfig::extend(EdgeSet::BOTTOM, EdgeBlanks::new(0.0, 1.0, 0.0, 0.0)),
        AnchorFn(|_| {}),
    );
    assert_ne!(fit, extended);

    harness.ticker.tick();
    assert_eq!(host.anchors(fit).map(|anchors| anchors.min.y), Some(0.2));
    assert_eq!(host.anchors(extended).map(|anchors| anchors.min.y), Some(0.0));

    assert!(host.stop(fit));
    harness.screen.set_safe_area(Rect::from_xywh(0.0, 50.0, 1000.0, 400.0));
    harness.ticker.tick();
    assert_eq!(host.anchors(fit), None);
    assert_eq!(host.anchors(extended).map(|anchors| anchors.max.y), Some(0.9));
}

#[test]
fn stopped_attachments_release_their_tick() {
    let harness = Harness::with_state(portrait_phone());
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let (pushes, target) = recorder();
    let handle = host.start(AdjustConfig::fit(), target);
    let _other = host.start(AdjustConfig::fit(), AnchorFn(|_| {}));
    assert_eq!(harness.ticker.registrations(), 2);

    assert!(host.stop(handle));
    assert!(!host.stop(handle));
    assert!(!host.contains(handle));
    assert_eq!(host.len(), 1);
    assert_eq!(harness.ticker.registrations(), 1);

    harness.ticker.tick();
    assert!(pushes.borrow().is_empty());

    drop(host);
    assert_eq!(harness.ticker.registrations(), 0);
}

#[test]
fn stop_all_clears_the_host() {
    let harness = Harness::with_state(portrait_phone());
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    host.start(AdjustConfig::fit(), AnchorFn(|_| {}));
    host.start(AdjustConfig::fit(), AnchorFn(|_| {}));

    host.stop_all();
    assert!(host.is_empty());
    assert_eq!(harness.ticker.registrations(), 0);

    // The host stays usable.
    let handle = host.start(AdjustConfig::fit(), AnchorFn(|_| {}));
    harness.ticker.tick();
    assert_ne!(host.anchors(handle), Some(AnchorRect::FULL));
}

#[test]
fn host_waits_for_a_ready_source() {
    let harness = Harness::new(ManualScreen::pending(portrait_phone()));
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let (pushes, target) = recorder();
    host.start(AdjustConfig::fit(), target);

    harness.ticker.tick();
    assert!(pushes.borrow().is_empty());

    harness.screen.set_ready(true);
    harness.ticker.tick();
    assert_eq!(pushes.borrow().len(), 1);
}

#[test]
fn reattaching_resets_anchors_moved_by_an_earlier_attachment() {
    let harness = Harness::with_state(portrait_phone());
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let container = Binding::container(AnchorRect::FULL);

    let handle = host.start(AdjustConfig::fit(), container.clone());
    harness.ticker.tick();
    assert_eq!(container.get().min.x, 0.03125);
    assert!(host.stop(handle));

    harness.screen.set_safe_area(Rect::from_xywh(0.0, 0.0, 640.0, 1000.0));
    let handle = host.start(AdjustConfig::fit(), container.clone());
    harness.ticker.tick();
    harness.ticker.tick();

    assert_eq!(container.get(), AnchorRect::FULL);
    assert_eq!(host.anchors(handle), Some(AnchorRect::FULL));
}

#[test]
fn configured_attachment_uses_loaded_adjustment() {
    let harness = Harness::with_state(ScreenState::new(
        Rect::from_xywh(0.0, 100.0, 1000.0, 350.0),
        Orientation::LandscapeLeft,
        Resolution::new(1000, 500),
        true,
    ));
    let mut host = SafeAreaHost::new(&harness.ticker, harness.screen.clone());
    let config =
        SafeAreaConfig::from_json(r#"{ "adjust": { "bottom": true }, "blank": { "bottom": 1.0 } }"#)
            .unwrap();

    let handle = host.start_configured(&config, AnchorFn(|_| {}));
    harness.ticker.tick();

    assert_eq!(host.anchors(handle).map(|anchors| anchors.min.y), Some(0.0));
    assert_eq!(host.anchors(handle).map(|anchors| anchors.max.y), Some(0.9));
}

#[test]
fn deserialized_rect_never_has_negative_extent() {
    let rect: Rect = serde_json::from_str(
        r#"{ "origin": { "x": 5.0, "y": 5.0 }, "size": { "width": -3.0, "height": 10.0 } }"#,
    )
    .unwrap();

    assert_eq!(rect.width(), 0.0);
    assert_eq!(rect.height(), 10.0);
    assert_eq!(rect, Rect::from_xywh(5.0, 5.0, -3.0, 10.0));
}
