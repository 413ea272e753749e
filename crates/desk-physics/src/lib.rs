#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]
//! # Desk Physics
//!
//! The interaction and stacking engine behind the desk toy: a 2.5D,
//! solver-free approximation of rigid bodies resting on a horizontal desk.
//! Objects collide, stack, get dragged out from under each other, lean and
//! tip over, all through geometric heuristics tuned for small desk scenes.
//!
//! ## Key Components
//!
//! -   **Registry:** [`ObjectKind`] and its [`PhysicsProfile`] table in
//!     [`registry`]. Unknown kinds fall back to generic defaults.
//! -   **World:** [`DeskWorld`] is an arena of [`DeskObject`]s with a lazily
//!     created [`Motion`] component per object.
//! -   **Geometry and stacking:** [`geometry`] answers radius, height and
//!     overlap queries; [`stack`] resolves who rests on whom.
//! -   **Interaction:** [`InteractionContext`] carries the pointer state. Its
//!     `begin_drag`, `drag_to` and `release` methods live in [`drag`] and
//!     [`drop`].
//! -   **Ambient physics:** [`AmbientStepper`] runs the throttled tick in
//!     [`stepper`] for every object not under the pointer.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use desk_physics::{AmbientStepper, DeskWorld, InteractionContext, ObjectKind, Vec2};
//!
//! let mut world = DeskWorld::default();
//! let paper = world.spawn_on_desk(ObjectKind::Paper, 0.0, 0.0);
//! let mug = world.spawn_on_desk(ObjectKind::Mug, 1.0, 0.0);
//!
//! let mut ctx = InteractionContext::new();
//! let mut stepper = AmbientStepper::new();
//! ctx.begin_drag(&mut world, mug, Vec2::new(1.0, 0.0), Duration::ZERO)?;
//! ctx.drag_to(&mut world, Vec2::new(0.0, 0.0), Duration::from_millis(500))?;
//! ctx.release(&mut world)?;
//! while world.animate_drops(0.3) {
//!     stepper.advance(&mut world, &ctx, Duration::from_millis(600));
//! }
//! assert!(world.get(mug).is_some() && world.get(paper).is_some());
//! # Ok::<(), desk_physics::PhysicsError>(())
//! ```

pub mod drag;
pub mod drop;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod object;
pub mod registry;
pub mod stack;
pub mod stepper;
pub mod tunables;
pub mod world;

pub use drag::DragFrame;
pub use drop::DropOutcome;
pub use error::PhysicsError;
pub use glam::{Vec2, Vec3};
pub use interaction::{InteractionContext, InteractionMode};
pub use object::{DeskObject, HolderSlot, Motion, ObjectFlags};
pub use registry::{ObjectKind, PhysicsProfile};
pub use stepper::{AmbientStepper, TickReport};
pub use tunables::Tunables;
pub use world::{BodyMut, DeskWorld, ObjectId};
