#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! JSON desk layouts: which objects sit where, plus optional tunables.
//!
//! A layout is the file form of a [`DeskWorld`]. Loading validates the
//! tunables and each placement; saving writes back what the physics layer
//! changes (position, yaw, scale and kind-specific fields).

mod save;

use std::path::Path;

use anyhow::{bail, Context, Result};
use desk_physics::{DeskObject, DeskWorld, ObjectKind, Tunables, Vec3};
use serde::{Deserialize, Serialize};

pub use save::SaveDebouncer;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeskLayout {
    #[serde(default)]
    pub tunables: Tunables,
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
}

/// One placed object as stored in a layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Kebab-case type tag; unrecognised tags load as generic objects.
    #[serde(rename = "type")]
    pub kind: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation_y: f32,
    #[serde(default = "one")]
    pub scale: f32,
    #[serde(default = "one")]
    pub collision_radius_multiplier: f32,
    #[serde(default = "one")]
    pub collision_height_multiplier: f32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub liquid_level: f32,
}

fn one() -> f32 {
    1.0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

impl ObjectDescriptor {
    #[must_use]
    pub fn new(kind: ObjectKind, position: Vec3) -> Self {
        Self {
            kind: kind.tag().to_owned(),
            position: position.to_array(),
            rotation_y: 0.0,
            scale: 1.0,
            collision_radius_multiplier: 1.0,
            collision_height_multiplier: 1.0,
            liquid_level: 0.0,
        }
    }

    /// A descriptor whose bottom rests on a surface at `surface_y`.
    #[must_use]
    pub fn resting_on(kind: ObjectKind, x: f32, z: f32, surface_y: f32) -> Self {
        let y = surface_y + kind.physics().base_offset;
        Self::new(kind, Vec3::new(x, y, z))
    }

    #[must_use]
    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::from_tag(&self.kind)
    }

    fn to_object(&self) -> Result<DeskObject> {
        let position = Vec3::from_array(self.position);
        if !position.is_finite() || !self.rotation_y.is_finite() {
            bail!("non-finite placement for `{}`", self.kind);
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            bail!("scale of `{}` must be positive, got {}", self.kind, self.scale);
        }
        for (name, value) in [
            ("collision_radius_multiplier", self.collision_radius_multiplier),
            ("collision_height_multiplier", self.collision_height_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                bail!("{name} of `{}` must be positive, got {value}", self.kind);
            }
        }

        let kind = self.object_kind();
        let mut object = DeskObject::new(kind, position)
            .with_scale(self.scale)
            .with_yaw(self.rotation_y);
        if kind == ObjectKind::Unknown {
            tracing::warn!(tag = %self.kind, "unknown object type, using generic physics");
            object.unknown_tag = Some(self.kind.clone());
        }
        object.radius_multiplier = self.collision_radius_multiplier;
        object.height_multiplier = self.collision_height_multiplier;
        object.liquid_level = self.liquid_level.clamp(0.0, 1.0);
        Ok(object)
    }

    fn from_object(object: &DeskObject) -> Self {
        let mut position = object.position;
        position.y = object.resting_y();
        Self {
            kind: object.type_tag().to_owned(),
            position: position.to_array(),
            rotation_y: object.rotation.y,
            scale: object.scale,
            collision_radius_multiplier: object.radius_multiplier,
            collision_height_multiplier: object.height_multiplier,
            liquid_level: object.liquid_level,
        }
    }
}

impl DeskLayout {
    /// # Errors
    ///
    /// Fails on malformed JSON.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid layout.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading layout {}", path.display()))?;
        Self::from_str(&json).with_context(|| format!("parsing layout {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn to_path(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("writing layout {}", path.display()))
    }

    /// Build a live world, validating the tunables and every placement.
    ///
    /// # Errors
    ///
    /// Fails on invalid tunables or an invalid object placement.
    pub fn into_world(self) -> Result<DeskWorld> {
        self.tunables.validate().context("invalid tunables")?;
        let mut world = DeskWorld::new(self.tunables);
        for (index, descriptor) in self.objects.iter().enumerate() {
            let object = descriptor
                .to_object()
                .with_context(|| format!("object {index}"))?;
            world.insert(object);
        }
        tracing::debug!(objects = world.len(), "layout loaded");
        Ok(world)
    }

    /// Snapshot a world for saving. Pending drops are written at their
    /// resting height.
    #[must_use]
    pub fn from_world(world: &DeskWorld) -> Self {
        Self {
            tunables: world.tunables.clone(),
            objects: world
                .iter()
                .map(|(_, object)| ObjectDescriptor::from_object(object))
                .collect(),
        }
    }

    /// Small desk used when no layout file is given.
    #[must_use]
    pub fn demo() -> Self {
        let tunables = Tunables::default();
        let desk = tunables.desk_surface_y;
        let books_top = desk + ObjectKind::Books.physics().height;
        let mut mug = ObjectDescriptor::resting_on(ObjectKind::Mug, 1.2, 0.4, desk);
        mug.liquid_level = 0.6;

        Self {
            objects: vec![
                ObjectDescriptor::resting_on(ObjectKind::Books, -1.0, 0.2, desk),
                ObjectDescriptor::resting_on(ObjectKind::Pen, -1.0, 0.2, books_top),
                ObjectDescriptor::resting_on(ObjectKind::Laptop, 0.0, -0.3, desk),
                ObjectDescriptor::resting_on(ObjectKind::Paper, 0.6, 0.5, desk),
                ObjectDescriptor::resting_on(ObjectKind::PenHolder, -1.8, -0.6, desk),
                mug,
                ObjectDescriptor::resting_on(ObjectKind::PhotoFrame, 1.6, -0.7, desk),
                ObjectDescriptor::resting_on(ObjectKind::Lamp, -2.4, 0.8, desk),
                ObjectDescriptor::resting_on(ObjectKind::Clock, 2.3, 0.9, desk),
            ],
            tunables,
        }
    }
}
