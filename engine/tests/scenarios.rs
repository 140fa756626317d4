//! End-to-end engine scenarios driven at the nominal 500 Hz tick rate
//! (dt = 2 ms) with default tuning.

use gp_core::types::{Point, Rect, Vec2};
use gp_engine::{EngineTuning, MotionEngine};

const DT: f64 = 0.002;

fn engine() -> MotionEngine {
    let mut engine = MotionEngine::new(EngineTuning::default());
    engine.update_desktop_bounds(Rect::new(0.0, 0.0, 2000.0, 1200.0));
    engine
}

fn assert_inside_bounds(engine: &MotionEngine) {
    let bounds = engine.desktop_bounds().unwrap();
    assert!(bounds.contains(engine.position()), "virtual cursor left bounds");
    assert!(bounds.contains(engine.raw_position()), "raw cursor left bounds");
}

#[test]
fn fast_flick_to_button_snap() {
    let mut engine = engine();
    engine.prime(Point::new(100.0, 100.0));

    // One 400 px step straight across the button's row.
    engine.handle_touch(Point::new(500.0, 100.0), DT, None);

    // The candidate arrives after the move; the raw-step crossing test
    // still captures it.
    let button = Rect::new(480.0, 80.0, 60.0, 40.0);
    engine.update_magnetic_target(Some(button));

    assert_eq!(engine.position(), Point::new(510.0, 100.0));
    assert_eq!(engine.velocity(), Vec2::ZERO);
    assert!(engine.is_locked());
    assert_eq!(engine.locked_target(), Some(button));
    assert_inside_bounds(&engine);
}

#[test]
fn snap_is_stable_under_zero_delta() {
    let mut engine = engine();
    engine.prime(Point::new(100.0, 100.0));
    engine.handle_touch(Point::new(500.0, 100.0), DT, None);
    engine.update_magnetic_target(Some(Rect::new(480.0, 80.0, 60.0, 40.0)));
    assert_eq!(engine.position(), Point::new(510.0, 100.0));

    // A second sample with no physical motion must not move the cursor.
    engine.handle_touch(Point::new(500.0, 100.0), DT, None);
    assert_eq!(engine.position(), Point::new(510.0, 100.0));
    assert!(engine.is_locked());
}

#[test]
fn hysteresis_holds_lock_on_overlapping_target() {
    let mut engine = engine();
    engine.prime(Point::new(199.0, 120.0));
    engine.handle_touch(Point::new(200.0, 120.0), DT, None);

    let held = Rect::new(100.0, 100.0, 200.0, 40.0);
    engine.update_magnetic_target(Some(held));
    assert!(engine.is_locked());
    assert_eq!(engine.position(), Point::new(200.0, 120.0));

    // A heavily overlapping replacement arrives while the pointer still
    // sits on the locked element: the lock holds, nothing is pending.
    let replacement = Rect::new(110.0, 110.0, 180.0, 30.0);
    engine.update_magnetic_target(Some(replacement));

    assert_eq!(engine.locked_target(), Some(held));
    assert_eq!(engine.current_target(), Some(held));
    assert!(engine.pending_switch_target().is_none());
}

#[test]
fn tall_sidebar_releases_on_horizontal_intent() {
    let mut engine = engine();
    engine.prime(Point::new(40.0, 350.0));

    // 40x300 sidebar, aspect 7.5, centered under the pointer.
    let sidebar = Rect::new(20.0, 200.0, 40.0, 300.0);
    engine.update_magnetic_target(Some(sidebar));

    // First touch locks on.
    engine.handle_touch(Point::new(43.0, 350.0), DT, None);
    assert!(engine.is_locked());
    assert_eq!(engine.position(), Point::new(40.0, 350.0));

    // Push right in steady 3 px steps. The directional release threshold
    // for this shape is max(40*0.48, snap*0.75, 18) = 19.2 px of
    // horizontal travel from the center.
    let mut x = 43.0;
    let mut released_at = None;
    for _ in 0..10 {
        x += 3.0;
        engine.handle_touch(Point::new(x, 350.0), DT, None);
        if !engine.is_locked() {
            released_at = Some(x);
            break;
        }
    }

    let released_at = released_at.expect("horizontal intent should release the lock");
    // Released on the first step past 40 + 19.2.
    assert_eq!(released_at, 61.0);
    // The virtual cursor rejoins the raw pointer on release.
    assert_eq!(engine.position(), Point::new(61.0, 350.0));
    assert!(engine.locked_target().is_none());
    assert_inside_bounds(&engine);
}

#[test]
fn glide_decays_and_snaps_onto_candidate() {
    let mut engine = engine();
    engine.prime(Point::new(397.6, 400.0));
    engine.handle_touch(Point::new(400.0, 400.0), DT, None); // 1200 px/s
    assert!((engine.velocity().dx - 1200.0).abs() < 1e-6);

    // Fingers lift; glide starts and one friction step runs.
    engine.handle_no_touch(Point::new(400.0, 400.0), DT, false, true);
    assert!(engine.is_gliding());
    assert!((engine.velocity().dx - 1184.4).abs() < 1e-6);
    assert!((engine.position().x - 402.3688).abs() < 1e-6);

    let target = Rect::new(550.0, 380.0, 40.0, 40.0);
    engine.update_magnetic_target(Some(target));

    let mut snapped = false;
    for _ in 0..400 {
        engine.handle_no_touch(Point::new(400.0, 400.0), DT, false, false);
        engine.update_magnetic_target(Some(target));
        assert_inside_bounds(&engine);
        if engine.is_locked() && engine.position() == Point::new(570.0, 400.0) {
            snapped = true;
            break;
        }
    }

    assert!(snapped, "glide should terminate on the candidate");
    assert_eq!(engine.position(), Point::new(570.0, 400.0));
    assert_eq!(engine.velocity(), Vec2::ZERO);
    assert!(!engine.is_gliding());
}

#[test]
fn multi_finger_suppression_kills_glide() {
    let mut engine = engine();
    engine.prime(Point::new(400.0, 400.0));
    engine.handle_touch(Point::new(404.0, 400.0), DT, None); // 2000 px/s

    // Release arrives with the multi-finger suppression window open.
    engine.handle_no_touch(Point::new(404.0, 400.0), DT, true, true);

    assert!(!engine.is_gliding());
    assert_eq!(engine.velocity(), Vec2::ZERO);
}

#[test]
fn strain_forces_unlock_on_narrow_element() {
    let mut engine = engine();

    // 20x80 element, aspect 4. Lock at its center.
    let narrow = Rect::new(100.0, 200.0, 20.0, 80.0);
    engine.prime(Point::new(110.0, 240.0));
    engine.update_magnetic_target(Some(narrow));
    engine.handle_touch(Point::new(110.0, 240.0), DT, None);
    assert!(engine.is_locked());

    // Drift down the element so the pointer is past the strain distance
    // (16 px) but short of the directional release threshold (18 px of
    // horizontal travel).
    engine.handle_touch(Point::new(113.0, 270.0), DT, None);
    assert!(engine.is_locked());

    // Three consecutive decisive pushes across the narrow axis.
    engine.handle_touch(Point::new(116.0, 270.0), DT, None);
    assert!(engine.is_locked());
    engine.handle_touch(Point::new(119.0, 270.0), DT, None);
    assert!(engine.is_locked());
    engine.handle_touch(Point::new(122.0, 270.0), DT, None);

    assert!(!engine.is_locked());
    assert!(engine.locked_target().is_none());
    // The remembered candidate becomes the working target again.
    assert_eq!(engine.current_target(), Some(narrow));
    assert_eq!(engine.position(), Point::new(122.0, 270.0));
}

#[test]
fn bounds_hold_across_every_tick() {
    let mut engine = engine();
    engine.prime(Point::new(1990.0, 1190.0));
    engine.update_magnetic_target(Some(Rect::new(1940.0, 1140.0, 50.0, 40.0)));

    let mut x = 1990.0;
    for _ in 0..50 {
        x += 17.0;
        engine.handle_touch(Point::new(x, 1195.0), DT, None);
        assert_inside_bounds(&engine);
    }
}

#[test]
fn disabling_magnetism_mid_lock_clears_and_stays_clear() {
    let mut engine = engine();
    engine.prime(Point::new(100.0, 100.0));
    engine.handle_touch(Point::new(500.0, 100.0), DT, None);
    let button = Rect::new(480.0, 80.0, 60.0, 40.0);
    engine.update_magnetic_target(Some(button));
    assert!(engine.is_locked());

    engine.set_magnetism_enabled(false);
    assert!(!engine.is_locked());
    assert!(engine.current_target().is_none());
    assert!(engine.last_seen_candidate().is_none());

    // Movement with magnetism off is plain integration.
    engine.handle_touch(Point::new(520.0, 100.0), DT, None);
    engine.update_magnetic_target(Some(button));
    assert!(!engine.is_locked());
    assert_eq!(engine.position(), Point::new(530.0, 100.0));
}
