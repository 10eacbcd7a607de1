//! Tumble Cube native runner
//!
//! Loads a puzzle record, plays a command script against it at a fixed
//! 60 Hz tick and prints the resulting solution as JSON.
//!
//! ```text
//! tumble-cube <puzzle.json> [--settings <settings.json>] [command...]
//! ```
//!
//! Commands: `drop`, `launch`, `snap`, `turn:<axis>` (e.g. `turn:-x`),
//! `rotate:<dx>,<dy>` (radians).

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};

use tumble_cube::consts::SIM_DT;
use tumble_cube::persistence::PuzzleRecord;
use tumble_cube::sim::{AssetRequest, Axis, GameEvent, GamePhase, GameState, Host, TickStatus};
use tumble_cube::solutions::score_to_stars;
use tumble_cube::Settings;

/// Stop a runaway animation after this many ticks (~5 minutes)
const MAX_TICKS: u32 = 60 * 300;

/// Host that logs everything it is told
#[derive(Default)]
struct LogHost {
    events: Vec<GameEvent>,
}

impl Host for LogHost {
    fn notify(&mut self, event: GameEvent) {
        log::info!("Event: {event:?}");
        self.events.push(event);
    }

    fn resolve_asset(&mut self, request: &AssetRequest<'_>) {
        log::debug!(
            "Asset: {} '{}' shader={} mesh={}",
            request.kind.as_str(),
            request.name,
            request.shader,
            request.visual.mesh
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Drop,
    Launch,
    Snap,
    Turn(Axis),
    Rotate(f32, f32),
}

impl Command {
    fn parse(arg: &str) -> Result<Self> {
        let (name, value) = arg.split_once(':').unwrap_or((arg, ""));
        Ok(match name {
            "drop" => Command::Drop,
            "launch" => Command::Launch,
            "snap" => Command::Snap,
            "turn" => Command::Turn(value.parse::<Axis>()?),
            "rotate" => {
                let (dx, dy) = value
                    .split_once(',')
                    .with_context(|| format!("rotate needs 'dx,dy', got '{value}'"))?;
                Command::Rotate(dx.trim().parse()?, dy.trim().parse()?)
            }
            _ => bail!("unknown command '{arg}'"),
        })
    }
}

struct Args {
    puzzle: String,
    settings: Option<String>,
    commands: Vec<Command>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let Some(puzzle) = args.next() else {
        bail!("usage: tumble-cube <puzzle.json> [--settings <settings.json>] [command...]");
    };
    let mut settings = None;
    let mut commands = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--settings" {
            settings = Some(args.next().context("--settings needs a path")?);
        } else {
            commands.push(Command::parse(&arg)?);
        }
    }
    Ok(Args {
        puzzle,
        settings,
        commands,
    })
}

fn run(state: &mut GameState, host: &mut LogHost, command: Command) -> Result<()> {
    match command {
        Command::Drop => state.drop(host)?,
        Command::Launch => state.launch(host)?,
        Command::Snap => state.rotate_to_axis()?,
        Command::Turn(axis) => state.turn(axis)?,
        // applied immediately, nothing to tick
        Command::Rotate(dx, dy) => return Ok(state.rotate(dx, dy)?),
    }

    for _ in 0..MAX_TICKS {
        match state.tick(SIM_DT, host) {
            TickStatus::Continue => {}
            TickStatus::Idle => return Ok(()),
            TickStatus::Done(outcome) => {
                log::info!("{command:?} finished: {outcome:?}");
                return Ok(());
            }
        }
    }
    bail!("{command:?} did not finish within {MAX_TICKS} ticks")
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Tumble Cube (native) starting...");

    let args = parse_args()?;
    let settings = match &args.settings {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {path}"))?;
            Settings::from_reader(BufReader::new(file))?
        }
        None => Settings::default(),
    };

    let file = File::open(&args.puzzle).with_context(|| format!("opening {}", args.puzzle))?;
    let record: PuzzleRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", args.puzzle))?;

    let mut host = LogHost::default();
    let mut state = GameState::new(settings);
    state.import(&record, &mut host);

    for command in args.commands {
        if let Err(e) = run(&mut state, &mut host, command) {
            log::warn!("{e:#}");
        }
    }

    log::info!(
        "Phase {:?} after {} events",
        state.phase(),
        host.events.len()
    );
    if state.phase() == GamePhase::Won {
        let stars = score_to_stars(state.solution().score(), state.model().target());
        log::info!("Solved '{}' for {stars} stars", state.model().name());
    }
    println!("{}", serde_json::to_string_pretty(&state.solution().to_record())?);
    Ok(())
}
