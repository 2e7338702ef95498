use std::thread;

use bevy_stable_fluid::{screen_to_uv, PointerHandle};
use glam::Vec2;

#[test]
fn screen_coordinates_flip_vertically() {
    assert_eq!(screen_to_uv(0.0, 0.0, 100.0, 50.0), Vec2::new(0.0, 1.0));
    assert_eq!(screen_to_uv(100.0, 50.0, 100.0, 50.0), Vec2::new(1.0, 0.0));
    assert_eq!(screen_to_uv(25.0, 12.5, 100.0, 50.0), Vec2::new(0.25, 0.75));
}

#[test]
fn moves_accumulate_until_taken() {
    let pointer = PointerHandle::new();
    pointer.press(Vec2::new(0.1, 0.1));
    pointer.move_to(Vec2::new(0.2, 0.1));
    pointer.move_to(Vec2::new(0.25, 0.2));

    let impulse = pointer.take_impulse().expect("pointer is down");
    assert!((impulse.delta - Vec2::new(0.15, 0.1)).length() < 1e-6);
    assert_eq!(impulse.position, Vec2::new(0.25, 0.2));

    let again = pointer.take_impulse().expect("still down");
    assert_eq!(again.delta, Vec2::ZERO);
}

#[test]
fn press_discards_hover_motion_and_release_stops_impulses() {
    let pointer = PointerHandle::new();
    pointer.move_to(Vec2::new(0.5, 0.5));
    assert!(pointer.take_impulse().is_none());

    pointer.press(Vec2::new(0.6, 0.6));
    assert_eq!(pointer.snapshot().delta, Vec2::ZERO);

    pointer.move_to(Vec2::new(0.7, 0.6));
    pointer.release();
    assert!(pointer.take_impulse().is_none());

    pointer.press(Vec2::new(0.7, 0.6));
    pointer.leave();
    assert!(!pointer.snapshot().down);
}

#[test]
fn concurrent_moves_are_consumed_exactly_once() {
    let pointer = PointerHandle::new();
    pointer.press(Vec2::ZERO);

    let writer = pointer.clone();
    let handle = thread::spawn(move || {
        for i in 1..=1000 {
            writer.move_to(Vec2::new(i as f32 * 0.001, 0.0));
        }
    });

    let mut taken = Vec2::ZERO;
    while !handle.is_finished() {
        if let Some(impulse) = pointer.take_impulse() {
            taken += impulse.delta;
        }
    }
    handle.join().unwrap();
    taken += pointer.take_impulse().map(|i| i.delta).unwrap_or(Vec2::ZERO);

    assert!((taken.x - 1.0).abs() < 1e-3, "consumed {taken}");
    assert_eq!(pointer.snapshot().delta, Vec2::ZERO);
}
