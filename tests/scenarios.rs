//! End-to-end coverage for the eight scenarios the specification calls out
//! by name (S1-S8), driven through the public API against a local `XConn`
//! test double rather than the library's internal `MockXConn`.
mod common;

use fenestra::event_buckets::EventBuckets;
use fenestra::geometry::Rect;
use fenestra::x::event::XEvent;
use fenestra::{config::WmConfig, WindowManager, Xid};

use common::TestXConn;

fn screen() -> Rect {
    Rect::new(0, 0, 1920, 1080)
}

/// S1: bounded ingest caps at `max_events_per_tick` and forces an
/// immediate re-poll, draining the remainder on the following tick.
#[test]
fn s1_bounded_ingest_spans_two_ticks() {
    let x = TestXConn::new();
    let mut wm = WindowManager::new(x.clone(), WmConfig::default(), screen()).unwrap();
    let cap = WmConfig::default().max_events_per_tick;

    for _ in 0..(cap + 4) {
        x.push_event(XEvent::KeyPress { window: Xid(1), code: 1, state: 0 });
    }

    wm.tick();
    assert!(wm.should_poll_immediately());

    wm.tick();
    assert!(!wm.should_poll_immediately());
}

/// S2: two `Expose` events on the same window coalesce into their union rect.
#[test]
fn s2_expose_union_rect() {
    let mut buckets = EventBuckets::new();
    buckets.ingest(XEvent::Expose { window: Xid(10), region: Rect::new(10, 10, 20, 20) });
    buckets.ingest(XEvent::Expose { window: Xid(10), region: Rect::new(25, 5, 10, 10) });

    let exposed = buckets.take_expose();
    assert_eq!(exposed, vec![(Xid(10), Rect::new(10, 5, 25, 25))]);
}

/// S3: two `DamageNotify` events on the same drawable coalesce the same way.
#[test]
fn s3_damage_union_rect() {
    let mut buckets = EventBuckets::new();
    buckets.ingest(XEvent::DamageNotify { drawable: Xid(99), region: Rect::new(0, 0, 50, 20) });
    buckets.ingest(XEvent::DamageNotify { drawable: Xid(99), region: Rect::new(40, 10, 20, 30) });

    let damage = buckets.take_damage();
    assert_eq!(damage, vec![(Xid(99), Rect::new(0, 0, 60, 40))]);
}

/// S4: `MotionNotify` on the same window is last-write-wins.
#[test]
fn s4_motion_last_write_wins() {
    let mut buckets = EventBuckets::new();
    buckets.ingest(XEvent::MotionNotify { window: Xid(42), root_x: 10, root_y: 10 });
    buckets.ingest(XEvent::MotionNotify { window: Xid(42), root_x: 50, root_y: 60 });

    let motion = buckets.take_motion();
    assert_eq!(motion, vec![(Xid(42), fenestra::geometry::Point::new(50, 60))]);
}

/// S5: a CSD client's first flush emits exactly a frame configure and a
/// client configure derived from `_GTK_FRAME_EXTENTS`; a second flush with
/// no new dirty bits emits nothing.
#[test]
fn s5_gtk_extents_flush_then_idempotent() {
    let x = TestXConn::new();
    let config = WmConfig::default();

    let mut record = fenestra::client::ClientRecord::new(Xid(100), fenestra::Handle::INVALID);
    record.hot.frame = Xid(200);
    record.hot.desired = Rect::new(50, 50, 400, 300);
    record.hot.gtk_frame_extents_set = true;
    record.hot.frame_extents = fenestra::client::FrameExtents {
        left: 10,
        right: 10,
        top: 20,
        bottom: 20,
    };
    record.hot.dirty |= fenestra::client::DirtyFlags::GEOM;

    fenestra::flusher::flush_client(&x, &mut record, &config);

    let log = x.log();
    let configures: Vec<_> = log
        .iter()
        .filter_map(|r| match r {
            common::Recorded::ConfigureWindow { window, cfg } => Some((*window, cfg.r)),
            _ => None,
        })
        .collect();
    assert_eq!(configures.len(), 2);
    assert_eq!(configures[0].1, Rect::new(40, 30, 400, 300));
    assert_eq!(configures[1].1, Rect::new(0, 0, 400, 300));

    x.clear_log();
    fenestra::flusher::flush_client(&x, &mut record, &config);
    assert!(x.log().is_empty());
}

/// S6: a `ReparentNotify` is dropped outright; it must not leave anything
/// behind in the unmapped/destroyed buckets.
#[test]
fn s6_reparent_notify_ignored() {
    let mut buckets = EventBuckets::new();
    buckets.ingest(XEvent::ReparentNotify { window: Xid(7), parent: Xid(1) });

    assert!(buckets.is_empty());
}

/// S7: acquisition refuses to proceed when the server denies the
/// `SubstructureRedirect` grab, and never maps a check window in that case.
#[test]
fn s7_acquisition_refused_on_substructure_redirect_denial() {
    let x = TestXConn::new();
    x.deny_substructure_redirect();

    let result = fenestra::acquisition::acquire(&x);
    assert!(result.is_err());
    assert!(x.log().iter().all(|r| !matches!(r, common::Recorded::MapWindow(_))));
}

/// S8: running acquisition twice on the same root leaves the first
/// instance's selection owner intact; the second attempt errors out.
#[test]
fn s8_second_acquisition_sees_first_owner_and_fails() {
    let x = TestXConn::new();

    let first = fenestra::acquisition::acquire(&x).unwrap();
    let owner_after_first = x
        .log()
        .into_iter()
        .find_map(|r| match r {
            common::Recorded::SetSelectionOwner { owner, .. } => Some(owner),
            _ => None,
        })
        .unwrap();
    assert_eq!(owner_after_first, first.supporting_wm_check);

    let second = fenestra::acquisition::acquire(&x);
    assert!(second.is_err());
}
