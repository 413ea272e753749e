//! # Drop Resolver
//!
//! Decides where a released object comes to rest: in a pen holder or empty
//! mug, on top of the highest thing beneath it, or flat on the desk.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::error::PhysicsError;
use crate::interaction::{InteractionContext, InteractionMode};
use crate::object::HolderSlot;
use crate::registry::ObjectKind;
use crate::stack::{all_stacked_above, settle_unsupported, surfaces_beneath};
use crate::world::{DeskWorld, ObjectId};

/// Inner floor of a holder above its bottom, at scale 1.
const HOLDER_FLOOR: f32 = 0.01;
/// Spread of the centre fallback when every slot is taken, at scale 1.
const CENTER_JITTER: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// The pen was inserted into a holder.
    Holder(HolderSlot),
    /// The object will settle at `target_y`, on top of `on` if any.
    Resting { target_y: f32, on: Option<ObjectId> },
}

/// Final resting origin height for `id` at its current position.
///
/// Anything stacked on `id` is never a landing candidate. The object lands
/// on the highest overlapping surface only if it was lifted clear of the
/// surface it slides on or top placement was requested; otherwise it stays
/// on that surface and slides underneath anything taller.
#[must_use]
pub fn calculate_stacking_y(world: &DeskWorld, id: ObjectId, prefer_top: bool) -> (f32, Option<ObjectId>) {
    let t = &world.tunables;
    let desk = t.desk_surface_y;
    let Some(obj) = world.get(id) else {
        return (desk, None);
    };
    let bottom = obj.bottom_y();
    let riders = all_stacked_above(world, id);
    let candidates: Vec<(ObjectId, f32)> = surfaces_beneath(world, id, obj.xz())
        .into_iter()
        .filter(|(other, top)| !riders.contains(other) && *top > desk)
        .collect();
    let highest = candidates.iter().copied().max_by(|a, b| a.1.total_cmp(&b.1));
    let support = candidates
        .iter()
        .copied()
        .filter(|&(_, top)| top <= bottom + t.lift_epsilon)
        .max_by(|a, b| a.1.total_cmp(&b.1));

    let support_top = support.map_or(desk, |(_, top)| top);
    let lifted_clear = obj.flags.lifted || bottom - support_top > t.lift_epsilon;
    let landing = if lifted_clear || prefer_top { highest } else { support };

    let (y, on) = match landing {
        Some((other, top)) if top > t.sanity_ceiling_y() => {
            tracing::warn!(%other, top, "ignoring implausibly tall stack");
            (obj.y_on_surface(desk), None)
        }
        Some((other, top)) => (obj.y_on_surface(top), Some(other)),
        None => (obj.y_on_surface(desk), None),
    };
    (y.min(t.hard_ceiling_y()), on)
}

/// A free slot in a pen holder or empty mug near the pen, with the pen's
/// resulting position.
#[must_use]
pub fn find_holder_slot(world: &DeskWorld, pen: ObjectId) -> Option<(HolderSlot, Vec3)> {
    let t = &world.tunables;
    let pen_obj = world.get(pen)?;
    if pen_obj.kind != ObjectKind::Pen {
        return None;
    }
    let pen_xz = pen_obj.xz();

    let (holder, holder_obj, _) = world
        .iter()
        .filter(|&(id, obj)| id != pen && !obj.flags.fallen && !obj.flags.is_handled())
        .filter_map(|(id, obj)| {
            let radius = match obj.kind {
                ObjectKind::PenHolder => t.pen_holder_radius,
                ObjectKind::Mug if obj.liquid_level < t.mug_max_liquid => t.mug_holder_radius,
                _ => return None,
            };
            let dist = pen_xz.distance(obj.xz());
            (dist < radius).then_some((id, obj, dist))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))?;

    let mut occupied = vec![false; usize::from(t.holder_slots)];
    for (_, obj) in world.iter() {
        if let Some(HolderSlot { holder: h, slot: Some(slot) }) = obj.holder {
            if h == holder {
                if let Some(taken) = occupied.get_mut(usize::from(slot)) {
                    *taken = true;
                }
            }
        }
    }

    let center = holder_obj.xz();
    let scale = holder_obj.scale;
    let free = occupied.iter().position(|taken| !taken);
    let (slot, xz) = if let Some(index) = free {
        let angle = index as f32 * TAU / f32::from(t.holder_slots);
        let offset = Vec2::from_angle(angle) * t.holder_slot_radius * scale;
        (u8::try_from(index).ok(), center + offset)
    } else {
        let jitter = Vec2::new(fastrand::f32() - 0.5, fastrand::f32() - 0.5) * CENTER_JITTER * scale;
        (None, center + jitter)
    };
    let y = pen_obj.y_on_surface(holder_obj.bottom_y() + HOLDER_FLOOR * scale);
    Some((HolderSlot { holder, slot }, Vec3::new(xz.x, y, xz.y)))
}

impl InteractionContext {
    /// Release the dragged object and resolve where it comes to rest.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::NotDragging`] without an active drag, or
    /// [`PhysicsError::UnknownObject`] if the dragged object was removed.
    pub fn release(&mut self, world: &mut DeskWorld) -> Result<DropOutcome, PhysicsError> {
        let id = self.dragged().ok_or(PhysicsError::NotDragging)?;
        let was_pulling_out = self.mode == InteractionMode::PullingOut;
        let prefer_top = self.layer_offset > 0.0;
        world.try_get(id)?;

        let outcome = if let Some((slot, position)) = find_holder_slot(world, id) {
            let body = world.body_mut(id).ok_or(PhysicsError::UnknownObject(id))?;
            body.object.position = position;
            body.object.holder = Some(slot);
            body.object.target_y = None;
            body.motion.velocity = Vec2::ZERO;
            tracing::debug!(%id, holder = %slot.holder, slot = ?slot.slot, "pen placed in holder");
            DropOutcome::Holder(slot)
        } else {
            let (target_y, on) = calculate_stacking_y(world, id, prefer_top);
            world.try_get_mut(id)?.target_y = Some(target_y);
            tracing::debug!(%id, target_y, on = ?on, "drop resolved");
            DropOutcome::Resting { target_y, on }
        };

        let obj = world.try_get_mut(id)?;
        obj.flags.lifted = false;
        obj.flags.pulling_out = false;
        self.reset();

        if was_pulling_out {
            settle_unsupported(world);
        }
        Ok(outcome)
    }
}
