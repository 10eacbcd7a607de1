//! Stored record types
//!
//! Every field carries `#[serde(default)]` so older or hand-written records
//! with missing entries still load.

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Name of the tutorial world
pub const WORLD_TUTORIAL: &str = "tutorial";

/// Integer cell coordinate as stored in records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<IVec3> for Location {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Location> for IVec3 {
    fn from(l: Location) -> Self {
        IVec3::new(l.x, l.y, l.z)
    }
}

/// Outline or sky entry (no location, scaled with the puzzle)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceRecord {
    pub shader: String,
    pub mesh: String,
    pub colour: String,
    pub texture: String,
    pub material: String,
}

/// Block, goal, sphere or scenery entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementRecord {
    pub name: String,
    pub shader: String,
    pub mesh: String,
    pub colour: String,
    pub texture: String,
    pub material: String,
    pub location: Location,
}

/// Portal entry; `link` is the paired portal's location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    pub link: Option<Location>,
}

/// Text shown alongside a puzzle; opaque to the simulation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogRecord {
    pub name: String,
    pub lines: Vec<String>,
}

/// A complete puzzle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleRecord {
    pub name: String,
    /// Outer dimension of the cube
    pub size: i32,
    /// Par score used for star ratings
    pub target: u32,
    pub outline: Option<SurfaceRecord>,
    pub sky: Vec<SurfaceRecord>,
    pub scenery: Vec<ElementRecord>,
    pub dialogs: Vec<DialogRecord>,
    pub blocks: Vec<ElementRecord>,
    pub goals: Vec<ElementRecord>,
    pub portals: Vec<PortalRecord>,
    pub spheres: Vec<ElementRecord>,
}

/// Final location of one sphere after a travel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveRecord {
    pub sphere: String,
    pub location: Location,
}

/// Recorded attempt at a puzzle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionRecord {
    pub moves: Vec<MoveRecord>,
    /// Completed turns (lower is better)
    pub score: u32,
}

/// An ordered collection of puzzles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldRecord {
    pub name: String,
    pub title: String,
    pub puzzles: Vec<PuzzleRecord>,
}

impl WorldRecord {
    /// Look up a puzzle by its 1-based number
    pub fn puzzle(&self, number: usize) -> Option<&PuzzleRecord> {
        number.checked_sub(1).and_then(|i| self.puzzles.get(i))
    }

    pub fn is_tutorial(&self) -> bool {
        is_tutorial(&self.name)
    }
}

pub fn is_tutorial(world_name: &str) -> bool {
    world_name == WORLD_TUTORIAL
}
