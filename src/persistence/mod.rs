//! Puzzle, solution and world records
//!
//! Features:
//! - Serde record types mirroring the stored puzzle format
//! - Length-delimited framing (varint length + JSON payload)
//!
//! Where records live on disk is up to the host; this module only defines
//! what goes over the wire.

pub mod codec;
pub mod records;

pub use codec::{read_delimited, write_delimited, MAX_FRAME_LEN};
pub use records::{
    DialogRecord, ElementRecord, Location, MoveRecord, PortalRecord, PuzzleRecord,
    SolutionRecord, SurfaceRecord, WorldRecord, is_tutorial, WORLD_TUTORIAL,
};
