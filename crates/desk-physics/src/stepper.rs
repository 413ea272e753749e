//! # Ambient Physics Stepper
//!
//! Throttled update for every object that is not being dragged, examined or
//! lying fallen: sliding with friction and desk-edge bounces, spin decay,
//! tilt with stability-scaled recovery and tip-over, and the collision
//! passes (dragged striker, spinning striker, all-pairs elastic).

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use glam::Vec2;

use crate::drag::{apply_drag_contact, carry_riders, find_drag_contacts};
use crate::geometry::{collision_radius, horizontal_distance, lean_toward, planar, vertical_overlap};
use crate::interaction::InteractionContext;
use crate::object::{DeskObject, Motion};
use crate::registry::ObjectKind;
use crate::stack::{objects_on_top, supporting_y};
use crate::world::{DeskWorld, ObjectId};

/// Below this height an object settles flat instead of lying on its side.
const TALL_OBJECT_HEIGHT: f32 = 0.1;
/// Where a tall fallen object's origin ends up, as a share of its height.
const FALLEN_HEIGHT_RATIO: f32 = 0.3;
const REST_EPSILON: f32 = 1e-4;
/// Share of a spinner's yaw rate lost per strike.
const SPIN_LOSS_PER_STRIKE: f32 = 0.2;

/// What one tick did, for logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub moved: usize,
    pub tipped_over: Vec<ObjectId>,
    pub collisions: usize,
}

/// Wall-clock throttle around [`tick`].
#[derive(Debug, Clone, Default)]
pub struct AmbientStepper {
    last_tick: Option<Duration>,
}

impl AmbientStepper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick if the configured interval has passed since the last.
    pub fn advance(&mut self, world: &mut DeskWorld, ctx: &InteractionContext, now: Duration) -> Option<TickReport> {
        let interval = world.tunables.tick_interval();
        if self
            .last_tick
            .is_some_and(|last| now.saturating_sub(last) < interval)
        {
            return None;
        }
        self.last_tick = Some(now);
        Some(tick(world, ctx))
    }
}

/// Ambient physics skips objects the pointer, examine view or a holder owns.
fn is_ambient(id: ObjectId, obj: &DeskObject, ctx: &InteractionContext) -> bool {
    ctx.active != Some(id) && !obj.flags.is_handled() && !obj.flags.fallen && obj.holder.is_none()
}

/// One unthrottled ambient step.
pub fn tick(world: &mut DeskWorld, ctx: &InteractionContext) -> TickReport {
    let mut report = TickReport::default();

    for id in world.ids() {
        let Some(obj) = world.get(id) else {
            continue;
        };
        if obj.flags.fallen {
            if let Some(motion) = world.motion_mut(id) {
                motion.tilt = Vec2::ZERO;
                motion.tilt_velocity = Vec2::ZERO;
            }
            continue;
        }
        if !is_ambient(id, obj, ctx) || world.motion(id).is_none() {
            continue;
        }
        if integrate_linear(world, id) {
            report.moved += 1;
        }
        integrate_spin(world, id);
        if integrate_tilt(world, id) {
            report.tipped_over.push(id);
        }
    }

    if let Some(dragged) = ctx.dragged() {
        for contact in find_drag_contacts(world, dragged) {
            apply_drag_contact(world, dragged, contact, ctx.drag_velocity, true);
            report.collisions += 1;
        }
    }
    report.collisions += resolve_rotation_collisions(world, ctx);
    report.collisions += resolve_elastic_collisions(world, ctx);
    report
}

fn integrate_linear(world: &mut DeskWorld, id: ObjectId) -> bool {
    let t = &world.tunables;
    let (Some(obj), Some(motion)) = (world.get(id), world.motion(id)) else {
        return false;
    };
    if motion.velocity.length() <= t.velocity_epsilon {
        return false;
    }
    let limit = (Vec2::new(t.desk_half_width, t.desk_half_depth)
        - Vec2::splat(collision_radius(obj, t)))
    .max(Vec2::ZERO);
    let friction = t.friction;
    let bounce = t.bounce_factor;
    let ticks_per_second = 1.0 / t.tick_interval().as_secs_f32();
    let riders = objects_on_top(world, id);

    let Some(body) = world.body_mut(id) else {
        return false;
    };
    let before = body.object.xz();
    let mut after = before + body.motion.velocity;
    let mut velocity = body.motion.velocity * friction;
    if after.x.abs() > limit.x {
        after.x = after.x.clamp(-limit.x, limit.x);
        velocity.x = -velocity.x * bounce;
    }
    if after.y.abs() > limit.y {
        after.y = after.y.clamp(-limit.y, limit.y);
        velocity.y = -velocity.y * bounce;
    }
    body.object.set_xz(after);
    body.motion.velocity = velocity;
    let speed = velocity.length() * ticks_per_second;

    world.carry_held(id, planar(after - before));
    carry_riders(world, id, riders, after - before, speed);
    true
}

fn integrate_spin(world: &mut DeskWorld, id: ObjectId) {
    let friction = world.tunables.friction;
    let Some(body) = world.body_mut(id) else {
        return;
    };
    let spin = body.motion.angular_velocity;
    if spin == 0.0 {
        return;
    }
    body.object.rotation.y += spin;
    body.motion.angular_velocity = if spin.abs() < REST_EPSILON { 0.0 } else { spin * friction };
}

/// Returns whether the object tipped over this tick.
fn integrate_tilt(world: &mut DeskWorld, id: ObjectId) -> bool {
    let t = &world.tunables;
    let (Some(obj), Some(motion)) = (world.get(id), world.motion(id)) else {
        return false;
    };
    // Pens lie flat by design.
    if obj.kind == ObjectKind::Pen {
        return false;
    }
    if motion.tilt.length() < REST_EPSILON && motion.tilt_velocity.length() < REST_EPSILON {
        return false;
    }
    let profile = obj.profile();
    let (damping, recovery, max_tilt, threshold) =
        (t.tilt_damping, t.tilt_recovery, t.max_tilt, t.tip_over_threshold);
    let surface = supporting_y(world, id, obj.xz());

    let Some(body) = world.body_mut(id) else {
        return false;
    };
    let motion = body.motion;
    let obj = body.object;
    motion.tilt += motion.tilt_velocity;
    motion.tilt_velocity *= damping;
    motion.tilt_velocity -= motion.tilt * recovery * profile.stability;

    let base = *obj
        .base_tilt
        .get_or_insert(Vec2::new(obj.rotation.x, obj.rotation.z));

    if motion.tilt.length() > threshold {
        let direction = motion.tilt.normalize_or_zero();
        obj.flags.fallen = true;
        obj.target_y = None;
        if profile.height > TALL_OBJECT_HEIGHT {
            obj.rotation.x = base.x + direction.x * FRAC_PI_2;
            obj.rotation.z = base.y + direction.y * FRAC_PI_2;
            obj.position.y = surface + profile.height * obj.scale * FALLEN_HEIGHT_RATIO;
        } else {
            obj.position.y = obj.y_on_surface(surface);
        }
        *motion = Motion {
            angular_velocity: motion.angular_velocity,
            ..Motion::default()
        };
        tracing::debug!(%id, kind = %obj.kind, "object tipped over");
        return true;
    }

    motion.tilt = motion.tilt.clamp(Vec2::splat(-max_tilt), Vec2::splat(max_tilt));
    if motion.tilt.length() < REST_EPSILON && motion.tilt_velocity.length() < REST_EPSILON {
        motion.tilt = Vec2::ZERO;
        motion.tilt_velocity = Vec2::ZERO;
    }
    obj.rotation.x = base.x + motion.tilt.x;
    obj.rotation.z = base.y + motion.tilt.y;
    false
}

/// Add a tilt-velocity impulse. Pens and fallen objects ignore it.
pub(crate) fn add_tilt_impulse(obj: &DeskObject, motion: &mut Motion, impulse: Vec2) {
    if obj.kind != ObjectKind::Pen && !obj.flags.fallen {
        motion.tilt_velocity += impulse;
    }
}

/// Nudge an object's lean, as a collision would.
pub fn apply_tilt_impulse(world: &mut DeskWorld, id: ObjectId, impulse: Vec2) {
    if let Some(body) = world.body_mut(id) {
        add_tilt_impulse(body.object, body.motion, impulse);
    }
}

/// Objects still spinning from a scroll-rotate strike their neighbours.
fn resolve_rotation_collisions(world: &mut DeskWorld, ctx: &InteractionContext) -> usize {
    let ids = world.ids();
    let mut collisions = 0;
    for &spinner in &ids {
        for &other in &ids {
            if other != spinner && strike_by_spin(world, ctx, spinner, other) {
                collisions += 1;
            }
        }
    }
    collisions
}

fn strike_by_spin(world: &mut DeskWorld, ctx: &InteractionContext, spinner: ObjectId, other: ObjectId) -> bool {
    let t = &world.tunables;
    let (Some(s), Some(o)) = (world.get(spinner), world.get(other)) else {
        return false;
    };
    let spin = world.motion(spinner).map_or(0.0, |m| m.angular_velocity);
    if spin.abs() <= t.angular_epsilon
        || !is_ambient(spinner, s, ctx)
        || !is_ambient(other, o, ctx)
        || !vertical_overlap(s, o, t)
    {
        return false;
    }
    let dist = horizontal_distance(s, o);
    let reach = t.rotation_overlap * (collision_radius(s, t) + collision_radius(o, t));
    if dist >= reach || dist <= t.min_separation {
        return false;
    }

    let normal = (o.xz() - s.xz()) / dist;
    let tangent = normal.perp() * spin.signum();
    let other_profile = o.profile();
    let ratio = (s.profile().weight / other_profile.weight).min(t.max_push_multiplier);
    let strength = spin.abs() * ratio;
    let impulse = (normal + tangent) * 0.5 * strength * t.rotation_push;
    let tilt = lean_toward(normal) * strength * t.tilt_force * (1.0 - other_profile.stability);
    let separation = normal * (reach - dist) * 0.5;

    {
        let Some((s_body, o_body)) = world.pair_mut(spinner, other) else {
            return false;
        };
        o_body.motion.velocity += impulse;
        add_tilt_impulse(o_body.object, o_body.motion, tilt);
        o_body.object.set_xz(o_body.object.xz() + separation);
        s_body.motion.angular_velocity *= 1.0 - SPIN_LOSS_PER_STRIKE;
    }
    world.carry_held(other, planar(separation));
    tracing::trace!(%spinner, %other, ?impulse, "rotation strike");
    true
}

fn resolve_elastic_collisions(world: &mut DeskWorld, ctx: &InteractionContext) -> usize {
    let ids: Vec<ObjectId> = world
        .iter()
        .filter(|&(id, obj)| is_ambient(id, obj, ctx))
        .map(|(id, _)| id)
        .collect();
    let mut collisions = 0;
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            if resolve_elastic_pair(world, a, b) {
                collisions += 1;
            }
        }
    }
    collisions
}

/// Share of the overlap each object of a colliding pair moves apart by.
const SEPARATION_SHARE: f32 = 0.25;

/// One-dimensional elastic exchange along the contact normal, weighted by
/// mass. Returns whether the pair was in contact.
pub fn resolve_elastic_pair(world: &mut DeskWorld, a: ObjectId, b: ObjectId) -> bool {
    let t = &world.tunables;
    let (Some(obj_a), Some(obj_b)) = (world.get(a), world.get(b)) else {
        return false;
    };
    if obj_a.flags.fallen || obj_b.flags.fallen || !vertical_overlap(obj_a, obj_b, t) {
        return false;
    }
    let dist = horizontal_distance(obj_a, obj_b);
    let reach = t.collision_overlap * (collision_radius(obj_a, t) + collision_radius(obj_b, t));
    if dist >= reach || dist <= t.min_separation {
        return false;
    }

    let normal = (obj_b.xz() - obj_a.xz()) / dist;
    let (profile_a, profile_b) = (obj_a.profile(), obj_b.profile());
    let total = profile_a.weight + profile_b.weight;
    let (share_a, share_b) = (profile_a.weight / total, profile_b.weight / total);
    let tilt_force = t.tilt_force;
    let correction = normal * (reach - dist) * SEPARATION_SHARE;

    {
        let Some((body_a, body_b)) = world.pair_mut(a, b) else {
            return false;
        };
        let closing = (body_a.motion.velocity - body_b.motion.velocity).dot(normal);
        if closing > 0.0 {
            body_a.motion.velocity -= normal * (closing * 2.0 * share_b);
            body_b.motion.velocity += normal * (closing * 2.0 * share_a);
            let lean_a = closing * share_b * (1.0 - profile_a.stability) * tilt_force;
            let lean_b = closing * share_a * (1.0 - profile_b.stability) * tilt_force;
            add_tilt_impulse(body_a.object, body_a.motion, lean_toward(-normal) * lean_a);
            add_tilt_impulse(body_b.object, body_b.motion, lean_toward(normal) * lean_b);
        }
        body_a.object.set_xz(body_a.object.xz() - correction);
        body_b.object.set_xz(body_b.object.xz() + correction);
    }
    world.carry_held(a, planar(-correction));
    world.carry_held(b, planar(correction));
    true
}
