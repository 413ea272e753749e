//! # Interaction Context
//!
//! Pointer-driven state that the physics passes need to know about. It is
//! passed explicitly into every entry point instead of living in globals.

use std::time::Duration;

use glam::Vec2;

use crate::error::PhysicsError;
use crate::world::{DeskWorld, ObjectId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Lifted above the desk and carried by the pointer.
    Dragging,
    /// Slid sideways out from under a stack without being lifted.
    PullingOut,
    Examining,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionContext {
    pub mode: InteractionMode,
    /// Object being dragged or examined.
    pub active: Option<ObjectId>,
    /// Offset from the pointer's drop-plane hit to the object's origin.
    pub grab_offset: Vec2,
    pub last_drag_position: Option<Vec2>,
    pub last_drag_time: Option<Duration>,
    /// Finite-difference pointer velocity in units per second.
    pub drag_velocity: Vec2,
    /// Scroll-requested extra height while dragging; positive values also
    /// request top-of-stack placement on release.
    pub layer_offset: f32,
}

impl InteractionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The object under drag, in either drag mode.
    #[must_use]
    pub fn dragged(&self) -> Option<ObjectId> {
        match self.mode {
            InteractionMode::Dragging | InteractionMode::PullingOut => self.active,
            InteractionMode::Idle | InteractionMode::Examining => None,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragged().is_some()
    }

    #[must_use]
    pub fn drag_speed(&self) -> f32 {
        self.drag_velocity.length()
    }

    /// Scroll while dragging. The offset never goes below zero.
    pub fn scroll_layer(&mut self, delta: f32) {
        if self.is_dragging() {
            self.layer_offset = (self.layer_offset + delta).max(0.0);
        }
    }

    /// Bring an object up close; ambient physics leaves it alone meanwhile.
    ///
    /// # Errors
    ///
    /// Fails if a drag is in progress or `id` is not live.
    pub fn begin_examine(&mut self, world: &mut DeskWorld, id: ObjectId) -> Result<(), PhysicsError> {
        if let Some(active) = self.dragged() {
            return Err(PhysicsError::AlreadyDragging(active));
        }
        self.end_examine(world);
        world.try_get_mut(id)?.flags.examining = true;
        self.mode = InteractionMode::Examining;
        self.active = Some(id);
        Ok(())
    }

    /// Hand the examined object back to the desk.
    pub fn end_examine(&mut self, world: &mut DeskWorld) {
        if self.mode != InteractionMode::Examining {
            return;
        }
        if let Some(obj) = self.active.and_then(|id| world.get_mut(id)) {
            obj.flags.examining = false;
            obj.flags.returning = false;
        }
        self.reset();
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
