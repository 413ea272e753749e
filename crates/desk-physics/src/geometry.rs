//! # Geometry Query Layer
//!
//! Radii, heights and overlap tests for live objects. Two radii coexist:
//! the tight collision radius keeps neighbours apart on the same surface,
//! while the generous stacking radius drives every support query.

use glam::{Vec2, Vec3};

use crate::object::DeskObject;
use crate::registry::ObjectKind;
use crate::tunables::Tunables;

/// Never larger than the stacking radius, whatever the sliders say.
#[must_use]
pub fn collision_radius(obj: &DeskObject, tunables: &Tunables) -> f32 {
    let radius = obj.kind.collision_base_radius()
        * tunables.collision_radius_multiplier
        * obj.radius_multiplier
        * obj.scale;
    radius.min(stacking_radius(obj))
}

#[must_use]
pub fn collision_height(obj: &DeskObject, tunables: &Tunables) -> f32 {
    obj.kind.collision_base_height()
        * tunables.collision_height_multiplier
        * obj.height_multiplier
        * obj.scale
}

/// Unaffected by the slider multipliers, only by scale.
#[must_use]
pub fn stacking_radius(obj: &DeskObject) -> f32 {
    obj.kind.stacking_base_radius() * obj.scale
}

/// Lift a desk-plane displacement into world space.
#[must_use]
pub fn planar(delta: Vec2) -> Vec3 {
    Vec3::new(delta.x, 0.0, delta.y)
}

#[must_use]
pub fn horizontal_distance(a: &DeskObject, b: &DeskObject) -> f32 {
    a.xz().distance(b.xz())
}

/// Bottom and top of the span used for the vertical-overlap test.
#[must_use]
pub fn vertical_span(obj: &DeskObject, tunables: &Tunables) -> (f32, f32) {
    let bottom = obj.bottom_y();
    (bottom, bottom + collision_height(obj, tunables))
}

/// Whether two vertical spans intersect by more than `tolerance`.
#[must_use]
pub fn spans_overlap(a: (f32, f32), b: (f32, f32), tolerance: f32) -> bool {
    a.0 < b.1 - tolerance && b.0 < a.1 - tolerance
}

/// Objects that do not overlap vertically never push each other sideways.
#[must_use]
pub fn vertical_overlap(a: &DeskObject, b: &DeskObject, tunables: &Tunables) -> bool {
    spans_overlap(
        vertical_span(a, tunables),
        vertical_span(b, tunables),
        tunables.vertical_overlap_tolerance,
    )
}

/// Rotate a desk-plane offset by a yaw angle about the vertical axis.
#[must_use]
pub fn rotate_yaw(v: Vec2, yaw: f32) -> Vec2 {
    let (sin, cos) = yaw.sin_cos();
    Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos)
}

/// A secondary collision cylinder in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionVolume {
    pub center: Vec2,
    pub radius: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Local-space cylinder: x, z, radius, height, base y above the bottom.
type LocalCylinder = (f32, f32, f32, f32, f32);

/// Upright screen hinged at the rear edge, leaning slightly backwards.
const LAPTOP_SCREEN: [LocalCylinder; 5] = [
    (-0.2, -0.17, 0.05, 0.22, 0.03),
    (-0.1, -0.175, 0.05, 0.22, 0.03),
    (0.0, -0.18, 0.05, 0.22, 0.03),
    (0.1, -0.175, 0.05, 0.22, 0.03),
    (0.2, -0.17, 0.05, 0.22, 0.03),
];

/// Extra collision volumes beyond the footprint radius. Only laptops have any.
#[must_use]
pub fn extra_collision_points(obj: &DeskObject) -> Vec<CollisionVolume> {
    let local: &[LocalCylinder] = match obj.kind {
        ObjectKind::Laptop => &LAPTOP_SCREEN,
        _ => &[],
    };
    let origin = obj.xz();
    let bottom = obj.bottom_y();
    local
        .iter()
        .map(|&(x, z, radius, height, base_y)| {
            let offset = rotate_yaw(Vec2::new(x, z) * obj.scale, obj.rotation.y);
            let volume_bottom = bottom + base_y * obj.scale;
            CollisionVolume {
                center: origin + offset,
                radius: radius * obj.scale,
                bottom: volume_bottom,
                top: volume_bottom + height * obj.scale,
            }
        })
        .collect()
}

/// Tilt axes `(about X, about Z)` that lean an object's top toward `direction`.
#[must_use]
pub fn lean_toward(direction: Vec2) -> Vec2 {
    Vec2::new(direction.y, -direction.x)
}
