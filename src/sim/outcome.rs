//! Win/loss evaluation and the solution log

use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::model::{ElementKind, PuzzleModel};
use crate::persistence::{MoveRecord, SolutionRecord};
use crate::{is_out_of_bounds, to_location};

/// Result of a completed animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Turn or snap finished
    Turned,
    /// Travel finished without deciding the game
    Travelled,
    /// Every sphere is on a goal
    Won,
    /// A sphere left the cube
    Lost,
}

/// Final location of one sphere after a travel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub sphere: String,
    pub location: IVec3,
}

/// Ordered move log plus score (completed turns)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    moves: Vec<Move>,
    score: u32,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn record_move(&mut self, sphere: impl Into<String>, location: IVec3) {
        let sphere = sphere.into();
        log::info!("Move: {sphere} {location}");
        self.moves.push(Move { sphere, location });
    }

    pub fn increment_score(&mut self) {
        self.score += 1;
    }

    pub fn to_record(&self) -> SolutionRecord {
        SolutionRecord {
            moves: self
                .moves
                .iter()
                .map(|m| MoveRecord {
                    sphere: m.sphere.clone(),
                    location: m.location.into(),
                })
                .collect(),
            score: self.score,
        }
    }
}

/// Decide the game after a travel and log every sphere's final cell
///
/// Any sphere outside the cube loses. Otherwise the game is won only when
/// every sphere sits on a goal; a puzzle without spheres is never won.
pub fn evaluate(model: &PuzzleModel, solution: &mut Solution) -> Outcome {
    let goals = model.locations(ElementKind::Goal);
    let spheres = model.elements(ElementKind::Sphere);

    let mut lost = false;
    let mut won = !spheres.is_empty();
    for sphere in spheres {
        let location = to_location(sphere.position);
        if is_out_of_bounds(location, model.size()) {
            lost = true;
        } else if !goals.contains(&location) {
            won = false;
        }
        solution.record_move(sphere.name.clone(), location);
    }

    if lost {
        Outcome::Lost
    } else if won {
        Outcome::Won
    } else {
        Outcome::Travelled
    }
}
