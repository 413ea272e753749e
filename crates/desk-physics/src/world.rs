//! # Desk World
//!
//! Arena of live desk objects. Objects live in dense slots indexed by a stable
//! [`ObjectId`]; removed slots go on a free list and are reused with a bumped
//! generation so stale ids never alias a newer object.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;
use crate::object::{DeskObject, Motion};
use crate::registry::ObjectKind;
use crate::stack;
use crate::tunables::Tunables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    object: DeskObject,
    motion: Option<Motion>,
}

impl Entry {
    fn body_mut(&mut self) -> BodyMut<'_> {
        BodyMut {
            object: &mut self.object,
            motion: self.motion.get_or_insert_with(Motion::default),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Mutable view of an object together with its motion component.
pub struct BodyMut<'a> {
    pub object: &'a mut DeskObject,
    pub motion: &'a mut Motion,
}

/// All placed objects plus the tunables that drive every query on them.
#[derive(Debug, Clone, Default)]
pub struct DeskWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pub tunables: Tunables,
}

impl DeskWorld {
    #[must_use]
    pub fn new(tunables: Tunables) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            tunables,
        }
    }

    /// Add an object as-is and return its id.
    pub fn insert(&mut self, object: DeskObject) -> ObjectId {
        let entry = Entry {
            object,
            motion: None,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            ObjectId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            ObjectId {
                index,
                generation: 0,
            }
        }
    }

    /// Create an object at scale 1 resting on the desk at `(x, z)`.
    pub fn spawn_on_desk(&mut self, kind: ObjectKind, x: f32, z: f32) -> ObjectId {
        let mut object = DeskObject::new(kind, Vec3::new(x, 0.0, z));
        object.position.y = object.y_on_surface(self.tunables.desk_surface_y);
        self.insert(object)
    }

    /// Create an object at scale 1 resting on top of `base`.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownObject`] if `base` is not live.
    pub fn spawn_on(&mut self, kind: ObjectKind, base: ObjectId) -> Result<ObjectId, PhysicsError> {
        let base_obj = self.try_get(base)?;
        let surface = base_obj.top_surface_y();
        let xz = base_obj.xz();
        let mut object = DeskObject::new(kind, Vec3::new(xz.x, 0.0, xz.y));
        object.position.y = object.y_on_surface(surface);
        Ok(self.insert(object))
    }

    /// Remove an object, release anything it held and let unsupported
    /// objects settle onto whatever is now beneath them.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownObject`] if `id` is not live.
    pub fn remove(&mut self, id: ObjectId) -> Result<DeskObject, PhysicsError> {
        if !self.contains(id) {
            return Err(PhysicsError::UnknownObject(id));
        }
        let slot = &mut self.slots[id.index()];
        let entry = slot.entry.take().ok_or(PhysicsError::UnknownObject(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        let desk = self.tunables.desk_surface_y;
        for slot in &mut self.slots {
            if let Some(other) = slot.entry.as_mut() {
                if other.object.holder.is_some_and(|h| h.holder == id) {
                    other.object.holder = None;
                    let y = other.object.y_on_surface(desk);
                    other.object.target_y = Some(y);
                }
            }
        }

        let settled = stack::settle_unsupported(self);
        tracing::debug!(%id, kind = %entry.object.kind, settled, "removed desk object");
        Ok(entry.object)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|s| s.generation == id.generation && s.entry.is_some())
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&DeskObject> {
        self.entry(id).map(|e| &e.object)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DeskObject> {
        self.entry_mut(id).map(|e| &mut e.object)
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownObject`] if `id` is not live.
    pub fn try_get(&self, id: ObjectId) -> Result<&DeskObject, PhysicsError> {
        self.get(id).ok_or(PhysicsError::UnknownObject(id))
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownObject`] if `id` is not live.
    pub fn try_get_mut(&mut self, id: ObjectId) -> Result<&mut DeskObject, PhysicsError> {
        self.get_mut(id).ok_or(PhysicsError::UnknownObject(id))
    }

    /// Motion component, if the object has taken part in physics yet.
    #[must_use]
    pub fn motion(&self, id: ObjectId) -> Option<&Motion> {
        self.entry(id).and_then(|e| e.motion.as_ref())
    }

    /// Motion component, created on first access.
    pub fn motion_mut(&mut self, id: ObjectId) -> Option<&mut Motion> {
        self.entry_mut(id)
            .map(|e| e.motion.get_or_insert_with(Motion::default))
    }

    pub fn body_mut(&mut self, id: ObjectId) -> Option<BodyMut<'_>> {
        self.entry_mut(id).map(Entry::body_mut)
    }

    /// Two distinct bodies borrowed mutably at once.
    pub fn pair_mut(&mut self, a: ObjectId, b: ObjectId) -> Option<(BodyMut<'_>, BodyMut<'_>)> {
        if a.index == b.index || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (lo, hi) = if a.index < b.index { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi.index());
        let lo_body = head[lo.index()].entry.as_mut()?.body_mut();
        let hi_body = tail[0].entry.as_mut()?.body_mut();
        if a.index < b.index {
            Some((lo_body, hi_body))
        } else {
            Some((hi_body, lo_body))
        }
    }

    /// Live ids in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &DeskObject)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|e| {
                (
                    ObjectId {
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        generation: slot.generation,
                    },
                    &e.object,
                )
            })
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper bound on [`ObjectId::index`], for dense per-object scratch.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Scroll-to-rotate: apply the yaw now and keep part of it as residual spin.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownObject`] if `id` is not live.
    pub fn spin(&mut self, id: ObjectId, delta_yaw: f32) -> Result<(), PhysicsError> {
        let residual = self.tunables.spin_residual;
        let body = self.body_mut(id).ok_or(PhysicsError::UnknownObject(id))?;
        body.object.rotation.y += delta_yaw;
        body.motion.angular_velocity += delta_yaw * residual;
        Ok(())
    }

    /// Stand a fallen object back up on whatever is beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownObject`] if `id` is not live.
    pub fn reset_fallen(&mut self, id: ObjectId) -> Result<(), PhysicsError> {
        let obj = self.try_get(id)?;
        if !obj.flags.fallen {
            return Ok(());
        }
        let xz = obj.xz();
        let surface = stack::supporting_y(self, id, xz);
        let body = self.body_mut(id).ok_or(PhysicsError::UnknownObject(id))?;
        let obj = body.object;
        obj.flags.fallen = false;
        if let Some(base) = obj.base_tilt.take() {
            obj.rotation.x = base.x;
            obj.rotation.z = base.y;
        }
        obj.target_y = Some(obj.y_on_surface(surface));
        body.motion.tilt = Vec2::ZERO;
        body.motion.tilt_velocity = Vec2::ZERO;
        Ok(())
    }

    /// Move every pending drop toward its target height by `rate` of the
    /// remaining gap. Returns whether anything is still animating.
    pub fn animate_drops(&mut self, rate: f32) -> bool {
        let mut animating = false;
        let mut shifts = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(entry) = slot.entry.as_mut() else {
                continue;
            };
            let obj = &mut entry.object;
            let Some(target) = obj.target_y else {
                continue;
            };
            let before = obj.position.y;
            let gap = target - before;
            if gap.abs() < 0.001 {
                obj.position.y = target;
                obj.target_y = None;
            } else {
                obj.position.y += gap * rate;
                animating = true;
            }
            let id = ObjectId {
                index: u32::try_from(index).unwrap_or(u32::MAX),
                generation: slot.generation,
            };
            shifts.push((id, obj.position.y - before));
        }
        for (holder, dy) in shifts {
            self.carry_held(holder, Vec3::new(0.0, dy, 0.0));
        }
        animating
    }

    /// Shift every pen sitting in `holder` by `delta`, keeping its place in
    /// the slot ring. Returns how many moved.
    pub fn carry_held(&mut self, holder: ObjectId, delta: Vec3) -> usize {
        if delta == Vec3::ZERO {
            return 0;
        }
        let mut moved = 0;
        for slot in &mut self.slots {
            let Some(entry) = slot.entry.as_mut() else {
                continue;
            };
            if entry.object.holder.is_some_and(|h| h.holder == holder) {
                entry.object.position += delta;
                moved += 1;
            }
        }
        moved
    }

    fn entry(&self, id: ObjectId) -> Option<&Entry> {
        self.slots
            .get(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_ref())
    }

    fn entry_mut(&mut self, id: ObjectId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_mut())
    }
}
