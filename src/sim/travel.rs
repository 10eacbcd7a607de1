//! Gravity travel for drop and launch
//!
//! Spheres move in fixed-point tenths of a cell so cell-center and bounds
//! checks are exact integer comparisons. Every sphere travels; each one stops
//! on its own and the travel ends when all have stopped. Spheres never block
//! each other. A sphere that re-enters a portal it already passed through
//! during the same travel is caught in a loop and stops there.

use std::collections::HashSet;

use glam::{IVec3, Vec3};

use super::model::{ElementKind, PuzzleModel};
use super::orientation::Orientation;
use crate::consts::{STEP_TENTHS, TENTHS_PER_CELL};
use crate::is_out_of_bounds;

/// Which way the spheres are pulled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelKind {
    /// Along world down
    Drop,
    /// Along world up
    Launch,
}

impl TravelKind {
    pub fn world_axis(self) -> Vec3 {
        match self {
            TravelKind::Drop => Vec3::NEG_Y,
            TravelKind::Launch => Vec3::Y,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelKind::Drop => "drop",
            TravelKind::Launch => "launch",
        }
    }
}

/// Why a sphere stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// Left the cube by twice its size
    OutOfBounds,
    /// Entered a goal cell
    Goal,
    /// Next cell holds a block
    Block,
    /// Entered the same portal twice
    PortalLoop,
}

#[derive(Debug, Clone)]
struct Traveller {
    name: String,
    tenths: IVec3,
    stop: Option<Stop>,
    portals: HashSet<IVec3>,
}

#[inline]
fn is_center(tenths: IVec3) -> bool {
    tenths % TENTHS_PER_CELL == IVec3::ZERO
}

/// One drop or launch in progress
#[derive(Debug, Clone)]
pub struct Travel {
    kind: TravelKind,
    axis: IVec3,
    acceleration: f32,
    started: bool,
    elapsed: f32,
    blocks: HashSet<IVec3>,
    goals: HashSet<IVec3>,
    travellers: Vec<Traveller>,
}

impl Travel {
    /// Snapshot blocks, goals and sphere positions. The world axis is mapped
    /// into the cube's frame and rounded; a unit vector always has a
    /// component above 0.5, so the axis is never zero, but it is only a
    /// cardinal direction when the cube is axis aligned.
    pub fn new(
        kind: TravelKind,
        orientation: &Orientation,
        model: &PuzzleModel,
        acceleration: f32,
    ) -> Self {
        let axis = orientation.to_local(kind.world_axis()).round().as_ivec3();
        log::info!("{} along local axis {axis}", kind.as_str());

        let travellers = model
            .elements(ElementKind::Sphere)
            .iter()
            .map(|s| Traveller {
                name: s.name.clone(),
                tenths: (s.position * TENTHS_PER_CELL as f32).round().as_ivec3(),
                stop: None,
                portals: HashSet::new(),
            })
            .collect();

        Self {
            kind,
            axis,
            acceleration,
            started: false,
            elapsed: 0.0,
            blocks: model.locations(ElementKind::Block),
            goals: model.locations(ElementKind::Goal),
            travellers,
        }
    }

    pub fn kind(&self) -> TravelKind {
        self.kind
    }

    /// Travel direction in the cube's frame
    pub fn axis(&self) -> IVec3 {
        self.axis
    }

    /// Stop reason per sphere name (None while still moving)
    pub fn stops(&self) -> impl Iterator<Item = (&str, Option<Stop>)> {
        self.travellers.iter().map(|t| (t.name.as_str(), t.stop))
    }

    /// Distance fallen so far under constant acceleration from rest
    pub fn distance(&self) -> f32 {
        0.5 * self.acceleration * self.elapsed * self.elapsed
    }

    /// Advance every moving sphere; true once all have stopped
    pub fn tick(&mut self, model: &mut PuzzleModel, dt: f32) -> bool {
        if self.started {
            self.elapsed += dt;
        } else {
            self.started = true;
        }

        let step = STEP_TENTHS as f32 / TENTHS_PER_CELL as f32;
        let steps = (self.distance() / step).ceil() as u32;
        let size = model.size();

        for i in 0..self.travellers.len() {
            if self.travellers[i].stop.is_some() {
                continue;
            }
            let mut tenths = self.travellers[i].tenths;
            let mut portals = std::mem::take(&mut self.travellers[i].portals);
            let mut stop = None;
            for _ in 0..steps {
                stop = self.step(&mut tenths, &mut portals, model, size);
                if stop.is_some() {
                    break;
                }
            }

            let traveller = &mut self.travellers[i];
            traveller.tenths = tenths;
            traveller.stop = stop;
            traveller.portals = portals;
            if let Some(stop) = stop {
                log::info!("Sphere '{}' stopped ({stop:?}) at {tenths}/10", traveller.name);
            }
            if let Some(sphere) = model.sphere_mut(&traveller.name) {
                sphere.position = tenths.as_vec3() / TENTHS_PER_CELL as f32;
            }
        }

        self.travellers.iter().all(|t| t.stop.is_some())
    }

    /// One sub-step; Some when the sphere stops
    fn step(
        &self,
        tenths: &mut IVec3,
        portals: &mut HashSet<IVec3>,
        model: &PuzzleModel,
        size: i32,
    ) -> Option<Stop> {
        let mut dest = *tenths + self.axis * STEP_TENTHS;
        if is_center(dest) {
            let cell = dest / TENTHS_PER_CELL;
            // twice the size so the sphere leaves the view before stopping
            if is_out_of_bounds(cell, size * 2) {
                *tenths = dest;
                return Some(Stop::OutOfBounds);
            }
            if self.goals.contains(&cell) {
                *tenths = dest;
                return Some(Stop::Goal);
            }
            if let Some(link) = model.link(cell) {
                if !portals.insert(cell) {
                    log::warn!("Sphere re-entered portal at {cell}; stopping");
                    *tenths = dest;
                    return Some(Stop::PortalLoop);
                }
                log::debug!("Sphere moved through portal at {cell} to {link}");
                dest = link * TENTHS_PER_CELL;
                *tenths = dest;
            }
        }

        if is_center(*tenths) && self.blocks.contains(&(*tenths / TENTHS_PER_CELL + self.axis)) {
            return Some(Stop::Block);
        }

        *tenths = dest;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DROP_ACCELERATION, LAUNCH_ACCELERATION};
    use crate::sim::model::Element;

    fn model(size: i32) -> PuzzleModel {
        PuzzleModel::new(size)
    }

    fn add(model: &mut PuzzleModel, kind: ElementKind, name: &str, at: (i32, i32, i32)) {
        let position = IVec3::new(at.0, at.1, at.2).as_vec3();
        model.elements_mut(kind).push(Element::new(name, kind, position));
    }

    fn run(travel: &mut Travel, model: &mut PuzzleModel) -> u32 {
        let mut ticks = 0;
        while !travel.tick(model, 1.0 / 60.0) {
            ticks += 1;
            assert!(ticks < 10_000, "travel never finished");
        }
        ticks
    }

    fn sphere(model: &PuzzleModel) -> Vec3 {
        model.elements(ElementKind::Sphere)[0].position
    }

    #[test]
    fn test_drop_into_goal() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 3, 0));
        add(&mut m, ElementKind::Goal, "g0", (0, -5, 0));
        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        assert_eq!(travel.axis(), IVec3::NEG_Y);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(travel.stops().next(), Some(("s0", Some(Stop::Goal))));
    }

    #[test]
    fn test_drop_out_of_bounds_stops_at_twice_size() {
        let mut m = model(4);
        add(&mut m, ElementKind::Sphere, "s0", (1, 0, 0));
        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(1.0, -9.0, 0.0));
        assert_eq!(travel.stops().next().map(|s| s.1), Some(Some(Stop::OutOfBounds)));
    }

    #[test]
    fn test_block_stops_sphere_on_preceding_cell() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 4, 0));
        add(&mut m, ElementKind::Block, "b0", (0, 0, 0));
        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(travel.stops().next().map(|s| s.1), Some(Some(Stop::Block)));
    }

    #[test]
    fn test_sphere_resting_on_block_does_not_move() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 1, 0));
        add(&mut m, ElementKind::Block, "b0", (0, 0, 0));
        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_portal_teleports_and_keeps_falling() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 4, 0));
        add(&mut m, ElementKind::Portal, "pa", (0, 2, 0));
        add(&mut m, ElementKind::Portal, "pb", (3, 2, 0));
        add(&mut m, ElementKind::Goal, "g0", (3, -4, 0));
        m.link_portals(IVec3::new(0, 2, 0), IVec3::new(3, 2, 0));

        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(3.0, -4.0, 0.0));
    }

    #[test]
    fn test_portal_cycle_stops_on_second_entry() {
        let mut m = model(8);
        add(&mut m, ElementKind::Sphere, "s0", (0, 1, 0));
        add(&mut m, ElementKind::Portal, "pa", (0, -1, 0));
        add(&mut m, ElementKind::Portal, "pb", (0, 2, 0));
        m.link_portals(IVec3::new(0, -1, 0), IVec3::new(0, 2, 0));

        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(travel.stops().next().map(|s| s.1), Some(Some(Stop::PortalLoop)));
    }

    #[test]
    fn test_launch_uses_up_axis_and_turned_cube() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 0, 0));
        add(&mut m, ElementKind::Goal, "g0", (2, 0, 0));

        // cube turned so local +X points up in the world
        let mut orientation = Orientation::identity();
        orientation.set(glam::Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let mut travel = Travel::new(TravelKind::Launch, &orientation, &m, LAUNCH_ACCELERATION);
        assert_eq!(travel.kind(), TravelKind::Launch);
        assert_eq!(travel.axis(), IVec3::X);
        run(&mut travel, &mut m);
        assert_eq!(sphere(&m), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_all_spheres_travel_independently() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 4, 0));
        add(&mut m, ElementKind::Sphere, "s1", (2, 4, 0));
        add(&mut m, ElementKind::Block, "b0", (2, 1, 0));
        add(&mut m, ElementKind::Goal, "g0", (0, -3, 0));

        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        run(&mut travel, &mut m);
        let spheres = m.elements(ElementKind::Sphere);
        assert_eq!(spheres[0].position, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(spheres[1].position, Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_first_tick_only_starts_the_clock() {
        let mut m = model(10);
        add(&mut m, ElementKind::Sphere, "s0", (0, 3, 0));
        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        assert!(!travel.tick(&mut m, 0.5));
        assert_eq!(sphere(&m), Vec3::new(0.0, 3.0, 0.0));
        assert!(!travel.tick(&mut m, 0.1));
        assert!(sphere(&m).y < 3.0);
    }

    #[test]
    fn test_no_spheres_finishes_immediately() {
        let mut m = model(10);
        let mut travel = Travel::new(TravelKind::Drop, &Orientation::identity(), &m, DROP_ACCELERATION);
        assert!(travel.tick(&mut m, 0.0));
    }
}
