use thiserror::Error;

use crate::world::ObjectId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("no live object with id {0}")]
    UnknownObject(ObjectId),
    #[error("tunable `{name}` has invalid value {value}")]
    InvalidTunable { name: &'static str, value: f32 },
    #[error("no drag in progress")]
    NotDragging,
    #[error("object {0} is already being dragged")]
    AlreadyDragging(ObjectId),
}
