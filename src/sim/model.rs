//! In-memory puzzle: typed elements by kind plus linked portal pairs
//!
//! Elements keep the order they were imported in. Portal links are stored in
//! both directions and always removed in both directions.

use std::collections::{HashMap, HashSet};

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::persistence::{ElementRecord, Location, PortalRecord, PuzzleRecord, SurfaceRecord};
use crate::settings::Settings;
use crate::consts::MAX_PUZZLE_SIZE;
use crate::to_location;

/// Element categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Block,
    Goal,
    Portal,
    Sphere,
    Scenery,
    Outline,
    Sky,
}

impl ElementKind {
    pub const COUNT: usize = 7;

    /// Kinds that occupy a cell, in the order `clear_location` searches them
    pub const PLACED: [ElementKind; 5] = [
        ElementKind::Block,
        ElementKind::Goal,
        ElementKind::Portal,
        ElementKind::Sphere,
        ElementKind::Scenery,
    ];

    fn index(self) -> usize {
        match self {
            ElementKind::Block => 0,
            ElementKind::Goal => 1,
            ElementKind::Portal => 2,
            ElementKind::Sphere => 3,
            ElementKind::Scenery => 4,
            ElementKind::Outline => 5,
            ElementKind::Sky => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Block => "block",
            ElementKind::Goal => "goal",
            ElementKind::Portal => "portal",
            ElementKind::Sphere => "sphere",
            ElementKind::Scenery => "scenery",
            ElementKind::Outline => "outline",
            ElementKind::Sky => "sky",
        }
    }
}

/// Opaque presentation identifiers, resolved by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visual {
    pub shader: String,
    pub mesh: String,
    pub colour: String,
    pub texture: String,
    pub material: String,
}

impl Visual {
    fn from_element(record: &ElementRecord) -> Self {
        Self {
            shader: record.shader.clone(),
            mesh: record.mesh.clone(),
            colour: record.colour.clone(),
            texture: record.texture.clone(),
            material: record.material.clone(),
        }
    }

    fn from_surface(record: &SurfaceRecord) -> Self {
        Self {
            shader: record.shader.clone(),
            mesh: record.mesh.clone(),
            colour: record.colour.clone(),
            texture: record.texture.clone(),
            material: record.material.clone(),
        }
    }

    fn to_surface(&self) -> SurfaceRecord {
        SurfaceRecord {
            shader: self.shader.clone(),
            mesh: self.mesh.clone(),
            colour: self.colour.clone(),
            texture: self.texture.clone(),
            material: self.material.clone(),
        }
    }
}

/// A puzzle element; `name` is unique within a puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
    pub position: Vec3,
    pub visual: Visual,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: ElementKind, position: Vec3) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            visual: Visual::default(),
        }
    }

    pub fn location(&self) -> IVec3 {
        to_location(self.position)
    }

    fn to_record(&self) -> ElementRecord {
        ElementRecord {
            name: self.name.clone(),
            shader: self.visual.shader.clone(),
            mesh: self.visual.mesh.clone(),
            colour: self.visual.colour.clone(),
            texture: self.visual.texture.clone(),
            material: self.visual.material.clone(),
            location: self.location().into(),
        }
    }
}

/// Puzzle contents: a sized cube, its elements and portal links
#[derive(Debug, Clone)]
pub struct PuzzleModel {
    name: String,
    size: i32,
    target: u32,
    elements: [Vec<Element>; ElementKind::COUNT],
    links: HashMap<IVec3, IVec3>,
    dialogs: Vec<crate::persistence::DialogRecord>,
}

impl PuzzleModel {
    /// Empty cube of the given outer dimension, clamped to `1..=MAX_PUZZLE_SIZE`
    pub fn new(size: i32) -> Self {
        Self {
            name: String::new(),
            size: size.clamp(1, MAX_PUZZLE_SIZE),
            target: 0,
            elements: Default::default(),
            links: HashMap::new(),
            dialogs: Vec::new(),
        }
    }

    /// Build a model from a stored puzzle, clamping every location into the cube
    pub fn from_record(record: &PuzzleRecord, settings: &Settings) -> Self {
        if record.size < 1 {
            log::warn!("Puzzle '{}' has size {}, using 1", record.name, record.size);
        } else if record.size > MAX_PUZZLE_SIZE {
            log::warn!(
                "Puzzle '{}' has size {}, using {MAX_PUZZLE_SIZE}",
                record.name,
                record.size
            );
        }
        let mut model = Self::new(record.size);
        model.name = record.name.clone();
        model.target = record.target;
        model.dialogs = record.dialogs.clone();

        let half = model.size / 2;
        let cell_min = IVec3::splat(-half);
        let cell_max = IVec3::splat(half);
        let sphere_min = IVec3::splat(1 - model.size);
        let sphere_max = IVec3::splat(model.size - 1);

        if let Some(outline) = record.outline.as_ref().filter(|_| settings.outline_enabled) {
            model.push_surface(ElementKind::Outline, "o0".to_string(), outline);
        }
        if settings.sky_enabled {
            for (i, sky) in record.sky.iter().enumerate() {
                model.push_surface(ElementKind::Sky, format!("sky{i}"), sky);
            }
        }
        for scenery in &record.scenery {
            model.push_record(ElementKind::Scenery, scenery, cell_min, cell_max);
        }
        for block in &record.blocks {
            model.push_record(ElementKind::Block, block, cell_min, cell_max);
        }
        for goal in &record.goals {
            model.push_record(ElementKind::Goal, goal, cell_min, cell_max);
        }
        for portal in &record.portals {
            let at = model.push_record(ElementKind::Portal, &portal.element, cell_min, cell_max);
            if let Some(link) = portal.link {
                let link = IVec3::from(link).clamp(cell_min, cell_max);
                model.link_portals(at, link);
            }
        }
        for sphere in &record.spheres {
            model.push_record(ElementKind::Sphere, sphere, sphere_min, sphere_max);
        }

        log::info!(
            "Imported '{}' (size {}): {} blocks, {} goals, {} portals, {} spheres",
            model.name,
            model.size,
            model.elements(ElementKind::Block).len(),
            model.elements(ElementKind::Goal).len(),
            model.elements(ElementKind::Portal).len(),
            model.elements(ElementKind::Sphere).len(),
        );
        model
    }

    fn push_surface(&mut self, kind: ElementKind, name: String, record: &SurfaceRecord) {
        let mut element = Element::new(name, kind, Vec3::ZERO);
        element.visual = Visual::from_surface(record);
        self.elements_mut(kind).push(element);
    }

    fn push_record(&mut self, kind: ElementKind, record: &ElementRecord, min: IVec3, max: IVec3) -> IVec3 {
        let location = IVec3::from(record.location).clamp(min, max);
        if location != IVec3::from(record.location) {
            log::debug!(
                "Clamped {} '{}' from {:?} to {}",
                kind.as_str(),
                record.name,
                record.location,
                location
            );
        }
        let mut element = Element::new(record.name.clone(), kind, location.as_vec3());
        element.visual = Visual::from_element(record);
        self.elements_mut(kind).push(element);
        location
    }

    /// Serialize back to the stored format; positions are rounded to cells
    pub fn to_record(&self) -> PuzzleRecord {
        let portals = self
            .elements(ElementKind::Portal)
            .iter()
            .map(|p| PortalRecord {
                element: p.to_record(),
                link: self.link(p.location()).map(Location::from),
            })
            .collect();
        let records = |kind: ElementKind| -> Vec<ElementRecord> {
            self.elements(kind).iter().map(Element::to_record).collect()
        };

        PuzzleRecord {
            name: self.name.clone(),
            size: self.size,
            target: self.target,
            outline: self
                .elements(ElementKind::Outline)
                .first()
                .map(|o| o.visual.to_surface()),
            sky: self
                .elements(ElementKind::Sky)
                .iter()
                .map(|s| s.visual.to_surface())
                .collect(),
            scenery: records(ElementKind::Scenery),
            dialogs: self.dialogs.clone(),
            blocks: records(ElementKind::Block),
            goals: records(ElementKind::Goal),
            portals,
            spheres: records(ElementKind::Sphere),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outer dimension of the cube
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Par score for star ratings
    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn elements(&self, kind: ElementKind) -> &[Element] {
        &self.elements[kind.index()]
    }

    pub fn elements_mut(&mut self, kind: ElementKind) -> &mut Vec<Element> {
        &mut self.elements[kind.index()]
    }

    /// All elements of every kind, in kind order
    pub fn all_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().flatten()
    }

    /// Cells occupied by elements of one kind
    pub fn locations(&self, kind: ElementKind) -> HashSet<IVec3> {
        self.elements(kind).iter().map(Element::location).collect()
    }

    pub fn sphere_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut(ElementKind::Sphere)
            .iter_mut()
            .find(|s| s.name == name)
    }

    /// Partner of the portal at `location`
    pub fn link(&self, location: IVec3) -> Option<IVec3> {
        self.links.get(&location).copied()
    }

    /// Link two portal cells, breaking any links either one already had
    pub fn link_portals(&mut self, a: IVec3, b: IVec3) {
        if a == b {
            log::warn!("Ignoring portal at {a} linked to itself");
            return;
        }
        if self.link(a) == Some(b) {
            return;
        }
        for end in [a, b] {
            if let Some(old) = self.unlink(end) {
                log::warn!("Portal {end} was linked to {old}; relinking");
            }
        }
        self.links.insert(a, b);
        self.links.insert(b, a);
    }

    /// Remove the link at `location` in both directions, returning the partner
    pub fn unlink(&mut self, location: IVec3) -> Option<IVec3> {
        let partner = self.links.remove(&location)?;
        self.links.remove(&partner);
        Some(partner)
    }

    /// Remove the element at `position` and any portal link there
    pub fn clear_location(&mut self, position: Vec3) -> Option<Element> {
        log::info!("Clearing {position}");
        if crate::is_cell_center(position) {
            self.unlink(to_location(position));
        }
        for kind in ElementKind::PLACED {
            let es = self.elements_mut(kind);
            if let Some(i) = es.iter().position(|e| e.position == position) {
                return Some(es.remove(i));
            }
        }
        log::warn!("No elements found at {position}");
        None
    }

    /// Remove every element and link
    pub fn clear_all(&mut self) {
        log::info!("Clearing all locations");
        for es in &mut self.elements {
            es.clear();
        }
        self.links.clear();
    }
}
