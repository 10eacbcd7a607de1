//! Deterministic simulation module
//!
//! All puzzle logic lives here. This module must be pure and deterministic:
//! - Driven only by commands and `tick(dt)`
//! - One animation at a time per puzzle
//! - Stable iteration order (insertion order per element kind)
//! - No rendering or platform dependencies

pub mod model;
pub mod orientation;
pub mod outcome;
pub mod state;
pub mod tick;
pub mod travel;

pub use model::{Element, ElementKind, PuzzleModel, Visual};
pub use orientation::{Axis, Camera, Orientation, SnapToAxis, TurnAnimation};
pub use outcome::{Move, Outcome, Solution, evaluate};
pub use state::{AssetRequest, GameEvent, GamePhase, GameState, Host};
pub use tick::{Animation, TickStatus, run_to_completion, tick};
pub use travel::{Stop, Travel, TravelKind};
