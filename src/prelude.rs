pub use bevy::prelude::*;
pub use log::{debug, info, warn};

pub use crate::actor::{ActorKind, ActorState, Placement, Pose, Vitals};
pub use crate::tuning::ArenaTuning;
