//! # Tunables
//!
//! Every empirically tuned constant of the interaction engine lives here, so
//! the values can be inspected, loaded from a layout file and validated
//! independently of the geometry code.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PhysicsError;

pub const MIN_SLIDER_MULTIPLIER: f32 = 0.2;
pub const MAX_SLIDER_MULTIPLIER: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // Desk
    pub desk_surface_y: f32,
    pub desk_half_width: f32,
    pub desk_half_depth: f32,

    // Runtime sliders
    pub collision_radius_multiplier: f32,
    pub collision_height_multiplier: f32,

    // Tolerances and overlap multipliers
    pub vertical_overlap_tolerance: f32,
    pub stack_contact_tolerance: f32,
    pub on_top_overlap: f32,
    pub support_overlap: f32,
    pub collision_overlap: f32,
    pub drop_overlap: f32,
    pub rotation_overlap: f32,
    pub min_separation: f32,
    pub lift_epsilon: f32,

    // Stack height ceilings, relative to the desk surface
    pub stack_sanity_ceiling: f32,
    pub stack_hard_ceiling: f32,

    // Stacking friction
    pub stacking_friction: f32,
    pub stacking_slip_threshold: f32,

    // Drag
    pub lift_height: f32,
    pub push_force: f32,
    pub min_push_speed: f32,
    pub max_push_multiplier: f32,

    // Ambient stepper
    pub tick_interval_ms: u64,
    pub friction: f32,
    pub bounce_factor: f32,
    pub velocity_epsilon: f32,
    pub angular_epsilon: f32,
    pub tilt_damping: f32,
    pub tilt_recovery: f32,
    pub max_tilt: f32,
    pub tip_over_threshold: f32,
    pub tilt_force: f32,
    pub rotation_push: f32,
    pub spin_residual: f32,

    // Holders
    pub pen_holder_radius: f32,
    pub mug_holder_radius: f32,
    pub mug_max_liquid: f32,
    pub holder_slots: u8,
    pub holder_slot_radius: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            desk_surface_y: 0.75,
            desk_half_width: 5.0,
            desk_half_depth: 2.5,

            collision_radius_multiplier: 1.0,
            collision_height_multiplier: 1.0,

            vertical_overlap_tolerance: 0.01,
            stack_contact_tolerance: 0.1,
            on_top_overlap: 0.9,
            support_overlap: 0.7,
            collision_overlap: 0.7,
            drop_overlap: 0.8,
            rotation_overlap: 0.8,
            min_separation: 0.01,
            lift_epsilon: 0.02,

            stack_sanity_ceiling: 3.0,
            stack_hard_ceiling: 2.5,

            stacking_friction: 0.8,
            stacking_slip_threshold: 2.0,

            lift_height: 0.15,
            push_force: 0.02,
            min_push_speed: 0.05,
            max_push_multiplier: 3.0,

            tick_interval_ms: 32,
            friction: 0.9,
            bounce_factor: 0.3,
            velocity_epsilon: 0.001,
            angular_epsilon: 0.01,
            tilt_damping: 0.9,
            tilt_recovery: 0.1,
            max_tilt: 0.35,
            tip_over_threshold: 0.45,
            tilt_force: 0.08,
            rotation_push: 0.5,
            spin_residual: 0.5,

            pen_holder_radius: 0.25,
            mug_holder_radius: 0.15,
            mug_max_liquid: 0.1,
            holder_slots: 6,
            holder_slot_radius: 0.035,
        }
    }
}

impl Tunables {
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Slider input; out-of-range values are clamped.
    pub fn set_collision_radius_multiplier(&mut self, value: f32) {
        self.collision_radius_multiplier = clamp_slider(value);
    }

    /// Slider input; out-of-range values are clamped.
    pub fn set_collision_height_multiplier(&mut self, value: f32) {
        self.collision_height_multiplier = clamp_slider(value);
    }

    /// Highest surface, relative to the desk, still trusted as a real stack.
    #[must_use]
    pub fn sanity_ceiling_y(&self) -> f32 {
        self.desk_surface_y + self.stack_sanity_ceiling
    }

    #[must_use]
    pub fn hard_ceiling_y(&self) -> f32 {
        self.desk_surface_y + self.stack_hard_ceiling
    }

    /// Check a loaded set of tunables before it drives a world.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidTunable`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let all = [
            ("desk_surface_y", self.desk_surface_y),
            ("desk_half_width", self.desk_half_width),
            ("desk_half_depth", self.desk_half_depth),
            ("collision_radius_multiplier", self.collision_radius_multiplier),
            ("collision_height_multiplier", self.collision_height_multiplier),
            ("vertical_overlap_tolerance", self.vertical_overlap_tolerance),
            ("stack_contact_tolerance", self.stack_contact_tolerance),
            ("stack_sanity_ceiling", self.stack_sanity_ceiling),
            ("stack_hard_ceiling", self.stack_hard_ceiling),
            ("stacking_slip_threshold", self.stacking_slip_threshold),
            ("lift_height", self.lift_height),
            ("push_force", self.push_force),
            ("min_push_speed", self.min_push_speed),
            ("max_push_multiplier", self.max_push_multiplier),
            ("tilt_recovery", self.tilt_recovery),
            ("max_tilt", self.max_tilt),
            ("tip_over_threshold", self.tip_over_threshold),
            ("tilt_force", self.tilt_force),
            ("rotation_push", self.rotation_push),
            ("spin_residual", self.spin_residual),
            ("pen_holder_radius", self.pen_holder_radius),
            ("mug_holder_radius", self.mug_holder_radius),
            ("holder_slot_radius", self.holder_slot_radius),
        ];
        for (name, value) in all {
            if !value.is_finite() {
                return Err(PhysicsError::InvalidTunable { name, value });
            }
        }

        for (name, value) in [
            ("desk_half_width", self.desk_half_width),
            ("desk_half_depth", self.desk_half_depth),
            ("stacking_slip_threshold", self.stacking_slip_threshold),
            ("tip_over_threshold", self.tip_over_threshold),
        ] {
            if value <= 0.0 {
                return Err(PhysicsError::InvalidTunable { name, value });
            }
        }

        for (name, value) in [
            ("collision_radius_multiplier", self.collision_radius_multiplier),
            ("collision_height_multiplier", self.collision_height_multiplier),
        ] {
            if !(MIN_SLIDER_MULTIPLIER..=MAX_SLIDER_MULTIPLIER).contains(&value) {
                return Err(PhysicsError::InvalidTunable { name, value });
            }
        }

        for (name, value) in [
            ("on_top_overlap", self.on_top_overlap),
            ("support_overlap", self.support_overlap),
            ("collision_overlap", self.collision_overlap),
            ("drop_overlap", self.drop_overlap),
            ("rotation_overlap", self.rotation_overlap),
            ("stacking_friction", self.stacking_friction),
            ("friction", self.friction),
            ("bounce_factor", self.bounce_factor),
            ("tilt_damping", self.tilt_damping),
            ("mug_max_liquid", self.mug_max_liquid),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PhysicsError::InvalidTunable { name, value });
            }
        }

        if self.stack_hard_ceiling > self.stack_sanity_ceiling {
            return Err(PhysicsError::InvalidTunable {
                name: "stack_hard_ceiling",
                value: self.stack_hard_ceiling,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(PhysicsError::InvalidTunable {
                name: "tick_interval_ms",
                value: 0.0,
            });
        }
        if self.holder_slots == 0 {
            return Err(PhysicsError::InvalidTunable {
                name: "holder_slots",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn clamp_slider(value: f32) -> f32 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(MIN_SLIDER_MULTIPLIER, MAX_SLIDER_MULTIPLIER)
    }
}
