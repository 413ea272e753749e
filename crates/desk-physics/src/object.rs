//! Desk object instances and their per-object physics component.

use glam::{Vec2, Vec3};

use crate::registry::{ObjectKind, PhysicsProfile};
use crate::world::ObjectId;

/// Transient interaction state of one object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectFlags {
    pub lifted: bool,
    pub pulling_out: bool,
    pub fallen: bool,
    pub examining: bool,
    pub returning: bool,
}

impl ObjectFlags {
    /// Examine/return animations own the transform while set.
    #[must_use]
    pub const fn suspends_ambient(&self) -> bool {
        self.examining || self.returning
    }

    /// Held by the pointer or the examine view rather than lying on a surface.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        self.lifted || self.pulling_out || self.examining || self.returning
    }
}

/// A pen's place inside a holder or an empty mug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolderSlot {
    pub holder: ObjectId,
    /// `None` when every slot was taken and the pen went to the centre.
    pub slot: Option<u8>,
}

/// A placed instance on the desk.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskObject {
    pub kind: ObjectKind,
    pub position: Vec3,
    /// Euler angles; `rotation.y` is the yaw on the desk plane.
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
    pub flags: ObjectFlags,
    pub holder: Option<HolderSlot>,
    pub radius_multiplier: f32,
    pub height_multiplier: f32,
    /// Resting rotation about X and Z, captured the first time tilt is applied.
    pub base_tilt: Option<Vec2>,
    /// Pending resting height for the drop tween.
    pub target_y: Option<f32>,
    /// Mugs only accept pens once this drops below the configured threshold.
    pub liquid_level: f32,
    /// Type tag this object was loaded with when it named no known kind.
    pub unknown_tag: Option<String>,
}

impl DeskObject {
    #[must_use]
    pub fn new(kind: ObjectKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
            flags: ObjectFlags::default(),
            holder: None,
            radius_multiplier: 1.0,
            height_multiplier: 1.0,
            base_tilt: None,
            target_y: None,
            liquid_level: 0.0,
            unknown_tag: None,
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.rotation.y = yaw;
        self
    }

    /// Type tag to persist: the original one for unknown kinds.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        self.unknown_tag.as_deref().unwrap_or(self.kind.tag())
    }

    #[must_use]
    pub const fn profile(&self) -> PhysicsProfile {
        self.kind.physics()
    }

    /// Position on the desk plane; `Vec2::y` carries world z.
    #[must_use]
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    pub fn set_xz(&mut self, xz: Vec2) {
        self.position.x = xz.x;
        self.position.z = xz.y;
    }

    /// Scaled distance from the origin down to the physical bottom.
    #[must_use]
    pub fn rest_offset(&self) -> f32 {
        self.profile().base_offset * self.scale
    }

    #[must_use]
    pub fn bottom_y(&self) -> f32 {
        self.position.y - self.rest_offset()
    }

    #[must_use]
    pub fn top_surface_y(&self) -> f32 {
        self.position.y + self.profile().height * self.scale
    }

    /// Height the object is settling toward, or its current height.
    #[must_use]
    pub fn resting_y(&self) -> f32 {
        self.target_y.unwrap_or(self.position.y)
    }

    /// Top surface once any pending drop tween has finished.
    #[must_use]
    pub fn resting_top_y(&self) -> f32 {
        self.resting_y() + self.profile().height * self.scale
    }

    /// Origin height that puts the bottom on a surface at `surface_y`.
    #[must_use]
    pub fn y_on_surface(&self, surface_y: f32) -> f32 {
        surface_y + self.rest_offset()
    }
}

/// Velocity, spin and tilt of one object.
///
/// The four quantities are always created together, the first time an object
/// takes part in a physics interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Desk-plane velocity in units per tick.
    pub velocity: Vec2,
    /// Yaw rate in radians per tick.
    pub angular_velocity: f32,
    /// Lean about X (`x`) and Z (`y`).
    pub tilt: Vec2,
    pub tilt_velocity: Vec2,
}

impl Motion {
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.velocity == Vec2::ZERO
            && self.angular_velocity == 0.0
            && self.tilt == Vec2::ZERO
            && self.tilt_velocity == Vec2::ZERO
    }
}
