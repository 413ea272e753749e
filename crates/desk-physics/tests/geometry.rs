use std::f32::consts::FRAC_PI_2;

use desk_physics::geometry::{
    collision_height, collision_radius, extra_collision_points, rotate_yaw, stacking_radius,
    vertical_overlap,
};
use desk_physics::{DeskObject, DeskWorld, ObjectKind, Tunables, Vec2, Vec3};

const EPS: f32 = 1e-5;

#[test]
fn collision_radius_never_exceeds_stacking_radius() {
    let t = Tunables::default();
    for kind in ObjectKind::ALL {
        for scale in [0.5, 1.0, 1.7, 3.0] {
            let obj = DeskObject::new(kind, Vec3::ZERO).with_scale(scale);
            let collision = collision_radius(&obj, &t);
            let stacking = stacking_radius(&obj);
            assert!(
                collision <= stacking + EPS,
                "{kind} at scale {scale}: collision {collision} > stacking {stacking}"
            );
        }
    }
}

#[test]
fn radius_ordering_holds_at_slider_extremes() {
    for slider in [0.2, 2.0] {
        let mut t = Tunables::default();
        t.set_collision_radius_multiplier(slider);
        for kind in ObjectKind::ALL {
            for object_multiplier in [0.5, 1.0, 2.0] {
                let mut obj = DeskObject::new(kind, Vec3::ZERO).with_scale(1.3);
                obj.radius_multiplier = object_multiplier;
                let collision = collision_radius(&obj, &t);
                let stacking = stacking_radius(&obj);
                assert!(
                    collision <= stacking + EPS,
                    "{kind} at slider {slider}: collision {collision} > stacking {stacking}"
                );
            }
        }
    }

    let mut t = Tunables::default();
    t.set_collision_radius_multiplier(2.0);
    let books = DeskObject::new(ObjectKind::Books, Vec3::ZERO);
    assert!((collision_radius(&books, &t) - 0.35).abs() < EPS);
}

#[test]
fn unknown_kind_uses_default_dimensions() {
    let t = Tunables::default();
    let obj = DeskObject::new(ObjectKind::from_tag("rubber-duck"), Vec3::ZERO);
    assert_eq!(obj.kind, ObjectKind::Unknown);
    assert!((collision_radius(&obj, &t) - 0.1).abs() < EPS);
    assert!((collision_height(&obj, &t) - 0.3).abs() < EPS);
    assert!((stacking_radius(&obj) - 0.25).abs() < EPS);
}

#[test]
fn sliders_scale_collision_but_not_stacking() {
    let mut t = Tunables::default();
    t.set_collision_radius_multiplier(2.0);
    t.set_collision_height_multiplier(0.5);
    let mut obj = DeskObject::new(ObjectKind::Books, Vec3::ZERO).with_scale(1.5);
    obj.radius_multiplier = 0.5;

    // 0.2 base * 2.0 global * 0.5 object * 1.5 scale
    assert!((collision_radius(&obj, &t) - 0.3).abs() < EPS);
    assert!((collision_height(&obj, &t) - 0.06 * 0.5 * 1.5).abs() < EPS);
    assert!((stacking_radius(&obj) - 0.35 * 1.5).abs() < EPS);
}

#[test]
fn vertical_overlap_is_symmetric() {
    let t = Tunables::default();
    let heights = [0.75, 0.78, 0.81, 0.9, 1.2];
    for a_kind in ObjectKind::ALL {
        for b_kind in ObjectKind::ALL {
            for &ya in &heights {
                for &yb in &heights {
                    let a = DeskObject::new(a_kind, Vec3::new(0.0, ya, 0.0));
                    let b = DeskObject::new(b_kind, Vec3::new(0.1, yb, 0.0));
                    assert_eq!(
                        vertical_overlap(&a, &b, &t),
                        vertical_overlap(&b, &a, &t),
                        "{a_kind}@{ya} vs {b_kind}@{yb}"
                    );
                }
            }
        }
    }
}

#[test]
fn stacked_objects_do_not_overlap_vertically() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let pen = world.spawn_on(ObjectKind::Pen, books).unwrap();
    let neighbour = world.spawn_on_desk(ObjectKind::Books, 0.3, 0.0);

    let t = &world.tunables;
    let (books, pen, neighbour) = (
        world.get(books).unwrap(),
        world.get(pen).unwrap(),
        world.get(neighbour).unwrap(),
    );
    assert!(!vertical_overlap(books, pen, t));
    assert!(vertical_overlap(books, neighbour, t));
}

#[test]
fn touching_within_tolerance_is_not_overlap() {
    let t = Tunables::default();
    let low = DeskObject::new(ObjectKind::Books, Vec3::new(0.0, 0.75, 0.0));
    // Bottom 5 mm below the books' top, inside the 1 cm tolerance.
    let high = DeskObject::new(ObjectKind::Books, Vec3::new(0.0, 0.805, 0.0));
    assert!(!vertical_overlap(&low, &high, &t));

    let deeper = DeskObject::new(ObjectKind::Books, Vec3::new(0.0, 0.78, 0.0));
    assert!(vertical_overlap(&low, &deeper, &t));
}

#[test]
fn rotate_yaw_quarter_turn() {
    let v = rotate_yaw(Vec2::new(1.0, 0.0), FRAC_PI_2);
    assert!(v.x.abs() < EPS);
    assert!((v.y + 1.0).abs() < EPS);
}

#[test]
fn laptop_screen_follows_yaw() {
    let laptop = DeskObject::new(ObjectKind::Laptop, Vec3::new(1.0, 0.75, 0.5));
    let volumes = extra_collision_points(&laptop);
    assert_eq!(volumes.len(), 5);
    let middle = volumes[2];
    assert!((middle.center - Vec2::new(1.0, 0.32)).length() < EPS);
    assert!((middle.bottom - 0.78).abs() < EPS);
    assert!((middle.top - 1.0).abs() < EPS);

    let turned = laptop.with_yaw(FRAC_PI_2);
    let middle = extra_collision_points(&turned)[2];
    assert!((middle.center - Vec2::new(0.82, 0.5)).length() < EPS);
}

#[test]
fn laptop_screen_scales_with_object() {
    let laptop = DeskObject::new(ObjectKind::Laptop, Vec3::new(0.0, 0.75, 0.0)).with_scale(2.0);
    let middle = extra_collision_points(&laptop)[2];
    assert!((middle.radius - 0.1).abs() < EPS);
    assert!((middle.center.y + 0.36).abs() < EPS);
    assert!((middle.top - middle.bottom - 0.44).abs() < EPS);
}

#[test]
fn only_laptops_have_extra_volumes() {
    for kind in ObjectKind::ALL {
        let obj = DeskObject::new(kind, Vec3::ZERO);
        assert_eq!(
            extra_collision_points(&obj).is_empty(),
            kind != ObjectKind::Laptop,
            "{kind}"
        );
    }
}
