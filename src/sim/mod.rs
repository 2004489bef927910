//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable entity iteration order
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::resolve_collisions;
pub use state::{
    EndReason, EntityKind, Grade, LaneEntity, PlayerVehicle, Rect, RunEvent, RunPhase, RunState,
    RunSummary, TokenKind, TokenState,
};
pub use tick::{TickInput, tick};
