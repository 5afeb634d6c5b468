use aimhq::input::Point;
use aimhq::overlay::{
    clamp, AnchorMode, Bounds, DragRelease, Draggable, Position, Viewport, ASSIST_HANDLE_SIZE,
    DRAG_THRESHOLD_PX, MACRO_TARGET_SIZE, SAFE_ZONE,
};
use proptest::prelude::*;

fn anchor() -> impl Strategy<Value = AnchorMode> {
    prop_oneof![Just(AnchorMode::TopLeft), Just(AnchorMode::Center)]
}

fn size_for(anchor: AnchorMode) -> aimhq::overlay::Size {
    match anchor {
        AnchorMode::TopLeft => ASSIST_HANDLE_SIZE,
        AnchorMode::Center => MACRO_TARGET_SIZE,
    }
}

proptest! {
    #[test]
    fn clamped_position_stays_in_bounds(
        x in -5000.0f64..5000.0,
        y in -5000.0f64..5000.0,
        w in 200.0f64..2000.0,
        h in 300.0f64..2000.0,
        anchor in anchor(),
    ) {
        let vp = Viewport::new(w, h);
        let size = size_for(anchor);
        let pos = clamp(x, y, size, anchor, vp, SAFE_ZONE);
        prop_assert!(Bounds::new(vp, SAFE_ZONE, size, anchor).contains(pos));
    }

    #[test]
    fn clamp_is_idempotent(
        x in -5000.0f64..5000.0,
        y in -5000.0f64..5000.0,
        w in 10.0f64..2000.0,
        h in 10.0f64..2000.0,
        anchor in anchor(),
    ) {
        let vp = Viewport::new(w, h);
        let size = size_for(anchor);
        let once = clamp(x, y, size, anchor, vp, SAFE_ZONE);
        let twice = clamp(once.x, once.y, size, anchor, vp, SAFE_ZONE);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn tiny_viewport_pins_to_minimum(x in -500.0f64..500.0, y in -500.0f64..500.0) {
        let vp = Viewport::new(40.0, 100.0);
        let pos = clamp(x, y, ASSIST_HANDLE_SIZE, AnchorMode::TopLeft, vp, SAFE_ZONE);
        prop_assert_eq!(pos, Position::new(SAFE_ZONE.side_x, SAFE_ZONE.top));
    }

    #[test]
    fn short_gestures_are_taps(dx in -4.9f64..4.9, dy in -4.9f64..4.9) {
        let vp = Viewport::new(800.0, 800.0);
        let start = Position::new(300.0, 300.0);
        let mut handle = Draggable::new(start, ASSIST_HANDLE_SIZE, AnchorMode::TopLeft);
        handle.begin_drag(Point::new(310.0, 310.0));
        prop_assert_eq!(handle.update_drag(Point::new(310.0 + dx, 310.0 + dy), vp, SAFE_ZONE), None);
        prop_assert_eq!(handle.end_drag(), Some(DragRelease::Tap));
        prop_assert_eq!(handle.position(), start);
    }

    #[test]
    fn crossing_the_threshold_latches(dx in DRAG_THRESHOLD_PX..100.0, back in 0.0f64..4.0) {
        let vp = Viewport::new(800.0, 800.0);
        let mut handle = Draggable::new(Position::new(300.0, 300.0), ASSIST_HANDLE_SIZE, AnchorMode::TopLeft);
        handle.begin_drag(Point::new(310.0, 310.0));
        prop_assert!(handle.update_drag(Point::new(310.0 + dx, 310.0), vp, SAFE_ZONE).is_some());
        // Coming back inside the threshold does not turn it into a tap
        prop_assert!(handle.update_drag(Point::new(310.0 + back, 310.0), vp, SAFE_ZONE).is_some());
        prop_assert!(matches!(handle.end_drag(), Some(DragRelease::Dropped(_))));
    }
}
