//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Integer positions, one fixed step per tick
//! - Seeded RNG only
//! - Stable iteration order (by slot)
//! - No rendering, input polling, or network dependencies

pub mod collision;
pub mod geom;
pub mod state;
pub mod tick;

pub use collision::{Arena, Collidable, Collision, Contact, Resolver};
pub use geom::{Displacement, Line, Point, Segment};
pub use state::{Action, Ball, Block, Entity, EntityId, KeyBindings, KeyId, Paddle, Roster, World};
pub use tick::tick;
