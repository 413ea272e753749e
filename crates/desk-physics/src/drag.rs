//! # Drag Interaction Controller
//!
//! Per-frame logic while the pointer drags an object: resistance from
//! whatever rests on it, friction-weighted carrying of the stack above it,
//! and pushes against everything it runs into.

use std::collections::VecDeque;
use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::error::PhysicsError;
use crate::geometry::{
    collision_radius, extra_collision_points, horizontal_distance, lean_toward, planar,
    spans_overlap, stacking_radius, vertical_overlap, vertical_span,
};
use crate::interaction::{InteractionContext, InteractionMode};
use crate::registry::PhysicsProfile;
use crate::stack::{highest_top_beneath, objects_on_top, stacked_weight, stacking_friction};
use crate::stepper::add_tilt_impulse;
use crate::tunables::Tunables;
use crate::world::{DeskWorld, ObjectId};

/// Fraction of the resistance-free step still applied at full resistance.
const MIN_DAMPING: f32 = 0.1;
const MAX_COMBINED_RESISTANCE: f32 = 0.9;
const MAX_STACKED_RESISTANCE: f32 = 0.8;
/// Share of a carried displacement kept as velocity after release.
const CARRY_VELOCITY_KICK: f32 = 0.3;
/// Drag speed band over which pushes ramp from nothing to full strength.
const PUSH_SPEED_RAMP: f32 = 0.1;
const SPIN_FROM_PUSH: f32 = 0.3;

/// Result of one drag frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFrame {
    pub position: Vec2,
    /// Combined resistance that damped this frame's step.
    pub resistance: f32,
    pub contacts: usize,
}

/// Fraction of a base's displacement passed to an object resting on it.
///
/// Slow drags transfer nearly all friction-coupled motion; fast drags slip
/// and lose up to half of it. Heavy riders resist being carried.
#[must_use]
pub fn movement_transfer(
    bottom: &PhysicsProfile,
    top: &PhysicsProfile,
    drag_speed: f32,
    tunables: &Tunables,
) -> f32 {
    let slip = (drag_speed / tunables.stacking_slip_threshold).clamp(0.0, 1.0);
    let transfer = stacking_friction(bottom, top, tunables) * (1.0 - 0.5 * slip);
    transfer * (1.0 - 0.3 * (top.weight / (bottom.weight + 0.1))).max(0.3)
}

/// Carry everything resting on `base` along with a displacement of `base`.
/// Returns how many objects moved.
pub fn move_stacked_objects(world: &mut DeskWorld, base: ObjectId, delta: Vec2, drag_speed: f32) -> usize {
    let riders = objects_on_top(world, base);
    carry_riders(world, base, riders, delta, drag_speed)
}

/// Like [`move_stacked_objects`] with riders collected before `base` moved.
pub(crate) fn carry_riders(
    world: &mut DeskWorld,
    base: ObjectId,
    riders: Vec<ObjectId>,
    delta: Vec2,
    drag_speed: f32,
) -> usize {
    if riders.is_empty() || delta == Vec2::ZERO {
        return 0;
    }
    let mut visited = vec![false; world.slot_count()];
    visited[base.index()] = true;
    let mut queue = VecDeque::from([(base, riders, delta)]);
    let mut moved = 0;

    while let Some((carrier, riders, delta)) = queue.pop_front() {
        let Some(carrier_obj) = world.get(carrier) else {
            continue;
        };
        let carrier_profile = carrier_obj.profile();
        let surface = carrier_obj.top_surface_y();

        for rider in riders {
            if std::mem::replace(&mut visited[rider.index()], true) {
                continue;
            }
            let Some(rider_obj) = world.get(rider) else {
                continue;
            };
            let transfer =
                movement_transfer(&carrier_profile, &rider_obj.profile(), drag_speed, &world.tunables);
            let next = objects_on_top(world, rider);
            let Some(body) = world.body_mut(rider) else {
                continue;
            };
            let step = delta * transfer;
            let xz = body.object.xz() + step;
            body.object.set_xz(xz);
            body.object.position.y = body.object.y_on_surface(surface);
            body.motion.velocity += step * CARRY_VELOCITY_KICK;
            moved += 1;
            queue.push_back((rider, next, step));
        }
    }
    moved
}

/// Resistance to sliding `id` toward `target` out from under what rests on it.
#[must_use]
pub fn pull_resistance(world: &DeskWorld, id: ObjectId, target: Vec2) -> f32 {
    let Some(obj) = world.get(id) else {
        return 0.0;
    };
    let radius = stacking_radius(obj);
    let total: f32 = objects_on_top(world, id)
        .into_iter()
        .filter_map(|top| world.get(top))
        .map(|top| {
            let reach = radius + stacking_radius(top);
            let overlap = if reach > 0.0 {
                (1.0 - target.distance(top.xz()) / reach).clamp(0.0, 1.0)
            } else {
                0.0
            };
            overlap * (top.profile().weight * 0.5).min(1.0)
        })
        .sum();
    total.clamp(0.0, 1.0)
}

/// Resistance from the total weight balanced on `id`.
#[must_use]
pub fn stacked_resistance(world: &DeskWorld, id: ObjectId) -> f32 {
    let Some(obj) = world.get(id) else {
        return 0.0;
    };
    let ratio = stacked_weight(world, id) / (obj.profile().weight + 0.1);
    (ratio * 0.4).clamp(0.0, MAX_STACKED_RESISTANCE)
}

/// Share of the requested step applied under `resistance`.
#[must_use]
pub fn damping_factor(resistance: f32) -> f32 {
    (1.0 - resistance.clamp(0.0, MAX_COMBINED_RESISTANCE) * 0.6).max(MIN_DAMPING)
}

/// `(push multiplier, speed multiplier)` for a dragged object striking another.
#[must_use]
pub fn push_multipliers(dragged_weight: f32, other_weight: f32, drag_speed: f32, tunables: &Tunables) -> (f32, f32) {
    let speed = ((drag_speed - tunables.min_push_speed) / PUSH_SPEED_RAMP).clamp(0.0, 1.0);
    let ratio = dragged_weight / other_weight.max(f32::EPSILON);
    ((ratio * 1.5).min(tunables.max_push_multiplier) * speed, speed)
}

/// Height of a lifted object hovering over `xz`.
#[must_use]
pub fn drag_stacking_y(world: &DeskWorld, id: ObjectId, xz: Vec2, layer_offset: f32) -> f32 {
    let t = &world.tunables;
    let desk = t.desk_surface_y;
    let Some(obj) = world.get(id) else {
        return desk;
    };
    let offset = t.lift_height + obj.rest_offset();
    let y = if layer_offset > 0.0 {
        desk + offset + layer_offset
    } else {
        let surface = match highest_top_beneath(world, id, xz) {
            Some((other, top)) if top > t.sanity_ceiling_y() => {
                tracing::warn!(%other, top, "ignoring implausibly tall stack");
                desk
            }
            Some((_, top)) => top.max(desk),
            None => desk,
        };
        surface + offset
    };
    y.min(t.hard_ceiling_y())
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DragContact {
    pub other: ObjectId,
    /// Unit vector from the dragged object toward the contact.
    pub normal: Vec2,
    pub overlap: f32,
    /// Hit one of the other object's extra volumes rather than its footprint.
    pub secondary: bool,
}

pub(crate) fn find_drag_contacts(world: &DeskWorld, dragged: ObjectId) -> Vec<DragContact> {
    let t = &world.tunables;
    let Some(d) = world.get(dragged) else {
        return Vec::new();
    };
    let d_radius = collision_radius(d, t);
    let d_span = vertical_span(d, t);
    let mut contacts = Vec::new();

    for (other, o) in world.iter() {
        if other == dragged || o.flags.fallen || o.flags.is_handled() || o.holder.is_some() {
            continue;
        }
        if vertical_overlap(d, o, t) {
            let dist = horizontal_distance(d, o);
            let reach = t.collision_overlap * (d_radius + collision_radius(o, t));
            if dist < reach && dist > t.min_separation {
                contacts.push(DragContact {
                    other,
                    normal: (o.xz() - d.xz()) / dist,
                    overlap: reach - dist,
                    secondary: false,
                });
            }
            continue;
        }
        for volume in extra_collision_points(o) {
            if !spans_overlap(d_span, (volume.bottom, volume.top), t.vertical_overlap_tolerance) {
                continue;
            }
            let dist = d.xz().distance(volume.center);
            let reach = d_radius + volume.radius;
            if dist < reach && dist > t.min_separation {
                contacts.push(DragContact {
                    other,
                    normal: (volume.center - d.xz()) / dist,
                    overlap: reach - dist,
                    secondary: true,
                });
                break;
            }
        }
    }
    contacts
}

/// Push the struck object away. With `full_impulse` the strike also tilts
/// and spins it, as the ambient tick does.
pub(crate) fn apply_drag_contact(
    world: &mut DeskWorld,
    dragged: ObjectId,
    contact: DragContact,
    drag_velocity: Vec2,
    full_impulse: bool,
) {
    let (Some(d), Some(o)) = (world.get(dragged), world.get(contact.other)) else {
        return;
    };
    let t = &world.tunables;
    let other_profile = o.profile();
    let (multiplier, speed) = push_multipliers(
        d.profile().weight,
        other_profile.weight,
        drag_velocity.length(),
        t,
    );
    let push = contact.normal * t.push_force * multiplier;
    let tilt = t.tilt_force * (1.0 - other_profile.stability) * multiplier * speed;
    let spin = drag_velocity.perp_dot(push) * SPIN_FROM_PUSH * speed;

    let separation = contact.normal * contact.overlap * 0.5;
    {
        let Some((d_body, o_body)) = world.pair_mut(dragged, contact.other) else {
            return;
        };
        o_body.motion.velocity += push;
        if contact.secondary {
            d_body.object.set_xz(d_body.object.xz() - separation);
        }
        o_body.object.set_xz(o_body.object.xz() + separation);

        if full_impulse {
            add_tilt_impulse(o_body.object, o_body.motion, lean_toward(contact.normal) * tilt);
            o_body.motion.angular_velocity += spin;
        }
    }
    if contact.secondary {
        world.carry_held(dragged, planar(-separation));
    }
    world.carry_held(contact.other, planar(separation));
    tracing::trace!(other = %contact.other, ?push, full_impulse, "drag contact");
}

/// Lightweight collision pass run every render frame during a drag.
pub fn update_drag_collisions(world: &mut DeskWorld, ctx: &InteractionContext) -> usize {
    let Some(dragged) = ctx.dragged() else {
        return 0;
    };
    let contacts = find_drag_contacts(world, dragged);
    for &contact in &contacts {
        apply_drag_contact(world, dragged, contact, ctx.drag_velocity, false);
    }
    contacts.len()
}

impl InteractionContext {
    /// Grab an object under the pointer.
    ///
    /// Anything resting on it turns the grab into a sideways pull-out;
    /// otherwise the object is lifted. Picking up a fallen object stands it
    /// back up.
    ///
    /// # Errors
    ///
    /// Fails if a drag is already in progress or `id` is not live.
    pub fn begin_drag(
        &mut self,
        world: &mut DeskWorld,
        id: ObjectId,
        pointer: Vec2,
        now: Duration,
    ) -> Result<InteractionMode, PhysicsError> {
        if let Some(active) = self.dragged() {
            return Err(PhysicsError::AlreadyDragging(active));
        }
        world.try_get(id)?;
        self.end_examine(world);
        world.reset_fallen(id)?;

        let pulling_out = !objects_on_top(world, id).is_empty();
        let body = world.body_mut(id).ok_or(PhysicsError::UnknownObject(id))?;
        body.object.holder = None;
        body.object.target_y = None;
        body.motion.velocity = Vec2::ZERO;
        if pulling_out {
            body.object.flags.pulling_out = true;
        } else {
            body.object.flags.lifted = true;
        }
        let xz = body.object.xz();

        self.mode = if pulling_out {
            InteractionMode::PullingOut
        } else {
            InteractionMode::Dragging
        };
        self.active = Some(id);
        self.grab_offset = xz - pointer;
        self.last_drag_position = Some(pointer);
        self.last_drag_time = Some(now);
        self.drag_velocity = Vec2::ZERO;
        self.layer_offset = 0.0;

        if !pulling_out {
            let y = drag_stacking_y(world, id, xz, 0.0);
            let obj = world.try_get_mut(id)?;
            let rise = y - obj.position.y;
            obj.position.y = y;
            world.carry_held(id, Vec3::new(0.0, rise, 0.0));
        }
        tracing::debug!(%id, mode = ?self.mode, "drag started");
        Ok(self.mode)
    }

    /// Follow the pointer for one frame.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::NotDragging`] without an active drag, or
    /// [`PhysicsError::UnknownObject`] if the dragged object was removed.
    pub fn drag_to(&mut self, world: &mut DeskWorld, pointer: Vec2, now: Duration) -> Result<DragFrame, PhysicsError> {
        let id = self.dragged().ok_or(PhysicsError::NotDragging)?;
        if let (Some(last_position), Some(last_time)) = (self.last_drag_position, self.last_drag_time) {
            let dt = now.saturating_sub(last_time).as_secs_f32();
            if dt > 0.0 {
                self.drag_velocity = (pointer - last_position) / dt;
            }
        }
        self.last_drag_position = Some(pointer);
        self.last_drag_time = Some(now);

        let obj = world.try_get(id)?;
        let t = &world.tunables;
        let current = obj.xz();
        let lifted = obj.flags.lifted;
        let limit = (Vec2::new(t.desk_half_width, t.desk_half_depth)
            - Vec2::splat(collision_radius(obj, t)))
        .max(Vec2::ZERO);
        let target = (pointer + self.grab_offset).clamp(-limit, limit);

        let pull = if self.mode == InteractionMode::PullingOut {
            pull_resistance(world, id, target)
        } else {
            0.0
        };
        let resistance = (pull + stacked_resistance(world, id)).min(MAX_COMBINED_RESISTANCE);
        let next = current + (target - current) * damping_factor(resistance);
        let riders = objects_on_top(world, id);
        let hover_y = lifted.then(|| drag_stacking_y(world, id, next, self.layer_offset));

        let obj = world.try_get_mut(id)?;
        let before = obj.position;
        obj.set_xz(next);
        if let Some(y) = hover_y {
            obj.position.y = y;
        }
        let moved = obj.position - before;
        world.carry_held(id, moved);
        carry_riders(world, id, riders, next - current, self.drag_speed());
        let contacts = update_drag_collisions(world, self);

        Ok(DragFrame {
            position: next,
            resistance,
            contacts,
        })
    }
}
