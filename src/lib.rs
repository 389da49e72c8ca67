//! Frame-driven combat core for a side-scrolling arena: one player, a wave of
//! grunts behind a gate, and a boss. Runs headless in a Bevy `World`.

pub mod actor;
pub mod animations;
pub mod arena;
pub mod audio;
pub mod camera;
pub mod character;
pub mod combat;
pub mod enemy;
pub mod gameflow;
pub mod hud;
pub mod prelude;
pub mod tuning;

pub use arena::{ArenaPlugin, ArenaSet, ArenaSim, ArenaTick, StepDelta};
pub use gameflow::{Encounter, EncounterEnded, Outcome};
pub use tuning::{ArenaTuning, TuningError};
