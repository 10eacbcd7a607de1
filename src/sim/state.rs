//! Puzzle instance state and the commands that start animations
//!
//! Everything a running puzzle needs lives in [`GameState`]: the model, the
//! orientation, the single animation slot, the solution and the phase.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::model::{Element, ElementKind, PuzzleModel, Visual};
use super::orientation::{Axis, Camera, Orientation, SnapToAxis, TurnAnimation};
use super::outcome::Solution;
use super::tick::{Animation, TickStatus, tick};
use super::travel::{Travel, TravelKind};
use crate::error::CommandError;
use crate::persistence::PuzzleRecord;
use crate::settings::Settings;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Commands accepted
    #[default]
    Active,
    /// Every sphere reached a goal
    Won,
    /// A sphere fell out of the cube
    Lost,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        self != GamePhase::Active
    }
}

/// Notifications sent to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TravelStarted,
    TravelCompleted,
    TurnCompleted,
    GameLost,
    GameWon,
}

/// Asset lookup the host performs for each imported element
#[derive(Debug, Clone, Copy)]
pub struct AssetRequest<'a> {
    /// Shader program, already resolved to the default when empty
    pub shader: &'a str,
    pub name: &'a str,
    pub kind: ElementKind,
    pub visual: &'a Visual,
}

/// Callbacks from the simulation to whatever embeds it
pub trait Host {
    fn notify(&mut self, _event: GameEvent) {}

    /// Called once per element on import; must not affect the simulation
    fn resolve_asset(&mut self, _request: &AssetRequest<'_>) {}
}

/// Host that ignores everything
impl Host for () {}

/// Host that records notifications in order
impl Host for Vec<GameEvent> {
    fn notify(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// A playable puzzle instance
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub(super) model: PuzzleModel,
    pub(super) orientation: Orientation,
    pub(super) camera: Camera,
    pub(super) animation: Option<Animation>,
    pub(super) solution: Solution,
    pub(super) phase: GamePhase,
}

impl GameState {
    /// Empty 1×1×1 puzzle; call [`GameState::import`] to load one
    pub fn new(settings: Settings) -> Self {
        let model = PuzzleModel::new(1);
        Self {
            settings: settings.validated(),
            camera: Camera::for_size(model.size()),
            model,
            orientation: Orientation::identity(),
            animation: None,
            solution: Solution::new(),
            phase: GamePhase::Active,
        }
    }

    /// Replace all state with a stored puzzle
    pub fn import<H: Host + ?Sized>(&mut self, record: &PuzzleRecord, host: &mut H) {
        log::info!("Importing '{}'", record.name);
        self.model = PuzzleModel::from_record(record, &self.settings);
        self.camera = Camera::for_size(self.model.size());
        self.orientation = Orientation::identity();
        self.animation = None;
        self.solution = Solution::new();
        self.phase = GamePhase::Active;

        for element in self.model.all_elements() {
            let shader = self.settings.resolve_shader(&element.visual.shader);
            host.resolve_asset(&AssetRequest {
                shader: &shader,
                name: &element.name,
                kind: element.kind,
                visual: &element.visual,
            });
        }
    }

    /// Current puzzle in stored form; only meaningful while at rest
    pub fn export(&self) -> PuzzleRecord {
        let record = self.model.to_record();
        log::info!("Exporting '{}'", record.name);
        record
    }

    pub fn model(&self) -> &PuzzleModel {
        &self.model
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Advance the running animation; see [`tick`]
    pub fn tick<H: Host + ?Sized>(&mut self, dt: f32, host: &mut H) -> TickStatus {
        tick(self, host, dt)
    }

    /// True while a turn, snap or travel is running
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn clear_location(&mut self, position: Vec3) -> Option<Element> {
        self.model.clear_location(position)
    }

    pub fn clear_all(&mut self) {
        self.model.clear_all();
    }

    /// Start a 90° turn about a world axis
    pub fn turn(&mut self, axis: Axis) -> Result<(), CommandError> {
        self.ensure_playable()?;
        log::info!("turn {axis:?}");
        let turn = TurnAnimation::new(axis, &self.orientation, self.settings.turn_duration);
        self.begin(Animation::Turn(turn))
    }

    /// Drag rotation; applied immediately, refused while animating
    pub fn rotate(&mut self, dx: f32, dy: f32) -> Result<(), CommandError> {
        if self.animation.is_some() {
            return Err(CommandError::AnimationActive);
        }
        log::debug!("rotate {dx}, {dy}");
        self.orientation.rotate(dx, dy);
        Ok(())
    }

    /// Start converging on the axes nearest the camera
    pub fn rotate_to_axis(&mut self) -> Result<(), CommandError> {
        self.ensure_playable()?;
        log::info!("rotate to axis");
        let snap = SnapToAxis::new(&self.orientation, &self.camera, self.settings.max_snap_angle);
        self.begin(Animation::SnapToAxis(snap))
    }

    /// Start moving spheres along world down
    pub fn drop<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), CommandError> {
        self.start_travel(TravelKind::Drop, self.settings.drop_acceleration, host)
    }

    /// Start moving spheres along world up
    pub fn launch<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<(), CommandError> {
        self.start_travel(TravelKind::Launch, self.settings.launch_acceleration, host)
    }

    fn start_travel<H: Host + ?Sized>(
        &mut self,
        kind: TravelKind,
        acceleration: f32,
        host: &mut H,
    ) -> Result<(), CommandError> {
        self.ensure_playable()?;
        if self.animation.is_some() {
            return Err(CommandError::AnimationActive);
        }
        if !self.orientation.is_axis_aligned() {
            log::warn!("{} started while the cube is not axis aligned", kind.as_str());
        }
        let travel = Travel::new(kind, &self.orientation, &self.model, acceleration);
        host.notify(GameEvent::TravelStarted);
        self.begin(Animation::Travel(travel))
    }

    fn ensure_playable(&self) -> Result<(), CommandError> {
        if self.phase.is_over() {
            return Err(CommandError::GameOver);
        }
        Ok(())
    }

    /// Claim the animation slot
    fn begin(&mut self, animation: Animation) -> Result<(), CommandError> {
        if self.animation.is_some() {
            return Err(CommandError::AnimationActive);
        }
        self.animation = Some(animation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{ElementRecord, Location};

    fn record() -> PuzzleRecord {
        PuzzleRecord {
            name: "single".to_string(),
            size: 4,
            goals: vec![ElementRecord {
                name: "g0".to_string(),
                location: Location::new(0, -2, 0),
                ..Default::default()
            }],
            spheres: vec![ElementRecord {
                name: "s0".to_string(),
                shader: "glow".to_string(),
                location: Location::new(0, 1, 0),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Assets(Vec<(String, String, ElementKind)>);

    impl Host for Assets {
        fn resolve_asset(&mut self, request: &AssetRequest<'_>) {
            self.0
                .push((request.shader.to_string(), request.name.to_string(), request.kind));
        }
    }

    #[test]
    fn test_import_requests_assets_with_default_shader() {
        let mut state = GameState::new(Settings::default());
        let mut assets = Assets::default();
        state.import(&record(), &mut assets);
        assert_eq!(
            assets.0,
            vec![
                ("basic".to_string(), "g0".to_string(), ElementKind::Goal),
                ("glow".to_string(), "s0".to_string(), ElementKind::Sphere),
            ]
        );
    }

    #[test]
    fn test_import_resets_orientation_and_camera() {
        let mut state = GameState::new(Settings::default());
        state.rotate(0.4, 0.2).unwrap();
        state.import(&record(), &mut ());
        assert_eq!(*state.orientation(), Orientation::identity());
        assert_eq!(state.camera().eye, Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(state.phase(), GamePhase::Active);
    }

    #[test]
    fn test_only_one_animation_at_a_time() {
        let mut state = GameState::new(Settings::default());
        state.import(&record(), &mut ());
        state.turn(Axis::PosX).unwrap();
        assert_eq!(state.turn(Axis::PosY), Err(CommandError::AnimationActive));
        assert_eq!(state.rotate_to_axis(), Err(CommandError::AnimationActive));
        assert_eq!(state.rotate(0.1, 0.1), Err(CommandError::AnimationActive));

        let mut events = Vec::new();
        assert_eq!(state.drop(&mut events), Err(CommandError::AnimationActive));
        assert!(events.is_empty(), "rejected travel must not notify");
    }

    #[test]
    fn test_drop_notifies_travel_start() {
        let mut state = GameState::new(Settings::default());
        state.import(&record(), &mut ());
        let mut events = Vec::new();
        state.launch(&mut events).unwrap();
        assert_eq!(events, vec![GameEvent::TravelStarted]);
        assert!(state.is_animating());
    }

    #[test]
    fn test_zero_snap_angle_still_converges() {
        let settings = Settings {
            max_snap_angle: 0.0,
            ..Default::default()
        };
        let mut state = GameState::new(settings);
        state.import(&record(), &mut ());
        state.rotate(0.3, 0.2).unwrap();
        state.rotate_to_axis().unwrap();
        let status = crate::sim::tick::run_to_completion(&mut state, &mut (), 1.0 / 60.0, 1000);
        assert_eq!(status, TickStatus::Done(crate::sim::Outcome::Turned));
    }

    #[test]
    fn test_oversized_import_does_not_overflow() {
        let mut state = GameState::new(Settings::default());
        let record = PuzzleRecord {
            size: 50_000,
            ..record()
        };
        state.import(&record, &mut ());
        let size = crate::consts::MAX_PUZZLE_SIZE;
        assert_eq!(state.model().size(), size);
        assert_eq!(state.camera().eye.z, (size as f32).powi(2) / 2.0);
        state.drop(&mut ()).unwrap();
        assert_eq!(state.tick(1.0 / 60.0, &mut ()), TickStatus::Continue);
    }

    #[test]
    fn test_clear_location_through_state() {
        let mut state = GameState::new(Settings::default());
        state.import(&record(), &mut ());
        let removed = state.clear_location(Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(removed.map(|e| e.kind), Some(ElementKind::Goal));
        assert!(state.export().goals.is_empty());
        state.clear_all();
        assert!(state.export().spheres.is_empty());
    }
}
