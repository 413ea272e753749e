//! # Stack Graph Resolver
//!
//! Support relationships between resting objects: who rests on whom, whole
//! stacks above an object, their weight, and where an object lands once its
//! support is gone.

use std::collections::VecDeque;

use glam::Vec2;

use crate::geometry::{horizontal_distance, stacking_radius};
use crate::object::DeskObject;
use crate::registry::PhysicsProfile;
use crate::tunables::Tunables;
use crate::world::{DeskWorld, ObjectId};

/// Candidates for resting on or under something: lying on a surface, not
/// held by the pointer, the examine view or a pen holder.
fn is_resting(obj: &DeskObject) -> bool {
    !obj.flags.is_handled() && obj.holder.is_none()
}

/// Whether `candidate` rests on some object whose top lies between
/// `base_top` and the candidate's bottom.
fn rests_on_something_higher(
    world: &DeskWorld,
    base: ObjectId,
    base_top: f32,
    candidate_id: ObjectId,
    candidate: &DeskObject,
) -> bool {
    let t = &world.tunables;
    let bottom = candidate.bottom_y();
    world.iter().any(|(mid_id, mid)| {
        let top = mid.top_surface_y();
        mid_id != base
            && mid_id != candidate_id
            && (is_resting(mid) || mid.flags.pulling_out)
            && !mid.flags.fallen
            && !mid.profile().no_stacking_on_top
            && top > base_top + t.min_separation
            && top <= bottom + t.min_separation
            && horizontal_distance(mid, candidate)
                < t.on_top_overlap * (stacking_radius(mid) + stacking_radius(candidate))
    })
}

/// Objects resting directly on `base`'s top surface, not on something in
/// between.
#[must_use]
pub fn objects_on_top(world: &DeskWorld, base: ObjectId) -> Vec<ObjectId> {
    let Some(base_obj) = world.get(base) else {
        return Vec::new();
    };
    let flags = base_obj.flags;
    if base_obj.profile().no_stacking_on_top || flags.fallen || flags.lifted || flags.examining {
        return Vec::new();
    }

    let t = &world.tunables;
    let top = base_obj.top_surface_y();
    let base_radius = stacking_radius(base_obj);
    world
        .iter()
        .filter(|&(id, candidate)| {
            id != base
                && is_resting(candidate)
                && (candidate.bottom_y() - top).abs() <= t.stack_contact_tolerance
                && horizontal_distance(base_obj, candidate)
                    < t.on_top_overlap * (base_radius + stacking_radius(candidate))
                && !rests_on_something_higher(world, base, top, id, candidate)
        })
        .map(|(id, _)| id)
        .collect()
}

/// Every object anywhere in the stack above `base`, breadth first.
///
/// `base` itself is never part of the result, even when support
/// relationships form a ring.
#[must_use]
pub fn all_stacked_above(world: &DeskWorld, base: ObjectId) -> Vec<ObjectId> {
    let mut visited = vec![false; world.slot_count()];
    let mut stacked = Vec::new();
    let mut queue = VecDeque::from([base]);
    if let Some(seen) = visited.get_mut(base.index()) {
        *seen = true;
    }

    while let Some(current) = queue.pop_front() {
        for above in objects_on_top(world, current) {
            let seen = &mut visited[above.index()];
            if !*seen {
                *seen = true;
                stacked.push(above);
                queue.push_back(above);
            }
        }
    }
    stacked
}

/// Total weight balanced anywhere above `base`.
#[must_use]
pub fn stacked_weight(world: &DeskWorld, base: ObjectId) -> f32 {
    all_stacked_above(world, base)
        .into_iter()
        .filter_map(|id| world.get(id))
        .map(|obj| obj.profile().weight)
        .sum()
}

/// Contact friction is bottlenecked by the slipperier surface.
#[must_use]
pub fn stacking_friction(bottom: &PhysicsProfile, top: &PhysicsProfile, tunables: &Tunables) -> f32 {
    bottom.friction.min(top.friction) * tunables.stacking_friction
}

/// Highest surface below `id` near `xz`, or the desk.
#[must_use]
pub fn supporting_y(world: &DeskWorld, id: ObjectId, xz: Vec2) -> f32 {
    let t = &world.tunables;
    let desk = t.desk_surface_y;
    let Some(obj) = world.get(id) else {
        return desk;
    };
    let ceiling = obj.resting_y() - obj.rest_offset() + t.vertical_overlap_tolerance;
    let radius = stacking_radius(obj);

    world
        .iter()
        .filter(|&(other_id, other)| {
            other_id != id
                && is_resting(other)
                && !other.flags.fallen
                && !other.profile().no_stacking_on_top
                && xz.distance(other.xz()) < t.support_overlap * (radius + stacking_radius(other))
        })
        .map(|(_, other)| other.resting_top_y())
        .filter(|&top| top <= ceiling && top > desk)
        .fold(desk, f32::max)
}

/// Every top surface horizontally overlapping `xz` that `id` could be
/// dropped onto, with the object it belongs to.
#[must_use]
pub fn surfaces_beneath(world: &DeskWorld, id: ObjectId, xz: Vec2) -> Vec<(ObjectId, f32)> {
    let t = &world.tunables;
    let Some(obj) = world.get(id) else {
        return Vec::new();
    };
    let radius = stacking_radius(obj);
    world
        .iter()
        .filter(|&(other_id, other)| {
            other_id != id
                && is_resting(other)
                && !other.flags.fallen
                && !other.profile().no_stacking_on_top
                && xz.distance(other.xz()) < t.drop_overlap * (radius + stacking_radius(other))
        })
        .map(|(other_id, other)| (other_id, other.top_surface_y()))
        .collect()
}

/// Highest top surface horizontally overlapping `xz` that `id` could be
/// dropped onto.
#[must_use]
pub fn highest_top_beneath(world: &DeskWorld, id: ObjectId, xz: Vec2) -> Option<(ObjectId, f32)> {
    surfaces_beneath(world, id, xz)
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Give every elevated object that lost its support a drop target on
/// whatever is now beneath it. Returns how many objects will fall.
pub fn settle_unsupported(world: &mut DeskWorld) -> usize {
    let desk = world.tunables.desk_surface_y;
    let epsilon = world.tunables.min_separation;

    let mut order: Vec<(ObjectId, f32)> = world
        .iter()
        .filter(|(_, obj)| is_resting(obj) && !obj.flags.fallen)
        .map(|(id, obj)| (id, obj.resting_y() - obj.rest_offset()))
        .filter(|&(_, bottom)| bottom - desk > epsilon)
        .collect();
    // Lower objects settle first so the ones above see their new height.
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut settled = 0;
    for (id, bottom) in order {
        let Some(xz) = world.get(id).map(DeskObject::xz) else {
            continue;
        };
        let surface = supporting_y(world, id, xz);
        if bottom - surface > epsilon {
            if let Some(obj) = world.get_mut(id) {
                obj.target_y = Some(obj.y_on_surface(surface));
                tracing::debug!(%id, from = bottom, to = surface, "object lost its support");
                settled += 1;
            }
        }
    }
    settled
}
