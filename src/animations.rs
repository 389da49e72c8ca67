use std::collections::{HashMap, HashSet};
use std::time::Duration;

use thiserror::Error;

use crate::prelude::*;

/// One row of a sprite sheet as the simulation sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSpec {
    pub frames: usize,
    pub frame_ms: u64,
    pub looping: bool,
    pub hit_frame: Option<usize>,
}

const fn looped(frames: usize, frame_ms: u64) -> Option<ClipSpec> {
    Some(ClipSpec { frames, frame_ms, looping: true, hit_frame: None })
}

const fn once(frames: usize, frame_ms: u64) -> Option<ClipSpec> {
    Some(ClipSpec { frames, frame_ms, looping: false, hit_frame: None })
}

const fn swing(frames: usize, frame_ms: u64, hit_frame: usize) -> Option<ClipSpec> {
    Some(ClipSpec { frames, frame_ms, looping: false, hit_frame: Some(hit_frame) })
}

// ====== Clip tables (indexed by Pose) ======
// Idle, Run, Walk, Attack1, Attack2, Hurt, Death
const PLAYER_CLIPS: [Option<ClipSpec>; Pose::COUNT] = [
    looped(10, 120),
    looped(10, 50),
    None,
    swing(4, 50, 2),
    swing(6, 50, 3),
    None,
    once(10, 90),
];

const GRUNT_CLIPS: [Option<ClipSpec>; Pose::COUNT] = [
    None,
    None,
    looped(8, 100),
    swing(3, 80, 1),
    None,
    None,
    once(3, 80),
];

const BOSS_CLIPS: [Option<ClipSpec>; Pose::COUNT] = [
    looped(9, 100),
    None,
    looped(12, 100),
    swing(7, 100, 3),
    swing(9, 100, 4),
    once(5, 80),
    once(9, 100),
];

pub const GEM_FRAMES: usize = 1;

/// Clip for `pose` on `kind`, if that kind has the pose at all.
pub fn clip(kind: ActorKind, pose: Pose) -> Option<&'static ClipSpec> {
    let table = match kind {
        ActorKind::Player => &PLAYER_CLIPS,
        ActorKind::Grunt => &GRUNT_CLIPS,
        ActorKind::Boss => &BOSS_CLIPS,
    };
    table[pose.index()].as_ref()
}

pub fn hit_frame(kind: ActorKind, pose: Pose) -> Option<usize> {
    clip(kind, pose).and_then(|c| c.hit_frame)
}

/// Logical sprite sequence identifier handed to the asset side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteSequence {
    Actor(ActorKind, Pose),
    Gem,
}

impl SpriteSequence {
    pub fn name(&self) -> String {
        match self {
            SpriteSequence::Actor(kind, pose) => format!("{}:{}", kind.name(), pose.name()),
            SpriteSequence::Gem => "gem:idle".to_string(),
        }
    }

    /// Frame count the simulation expects for this sequence.
    pub fn expected_frames(&self) -> usize {
        match self {
            SpriteSequence::Actor(kind, pose) => clip(*kind, *pose).map_or(0, |c| c.frames),
            SpriteSequence::Gem => GEM_FRAMES,
        }
    }
}

// ====== Animation clock ======

/// Frame index driven by accumulated simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    sequence: SpriteSequence,
    frame_count: usize,
    interval: Duration,
    looping: bool,
    index: usize,
    elapsed: Duration,
    finished: bool,
}

impl AnimationClock {
    pub fn new(sequence: SpriteSequence, frame_count: usize, interval: Duration, looping: bool) -> Self {
        Self {
            sequence,
            frame_count: frame_count.max(1),
            interval,
            looping,
            index: 0,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Clock for the pose's clip, or a single held frame when the kind lacks that pose.
    pub fn for_pose(kind: ActorKind, pose: Pose) -> Self {
        let sequence = SpriteSequence::Actor(kind, pose);
        match clip(kind, pose) {
            Some(c) => Self::new(sequence, c.frames, Duration::from_millis(c.frame_ms), c.looping),
            None => Self::new(sequence, 1, Duration::ZERO, true),
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.finished || self.frame_count <= 1 || self.interval.is_zero() {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            if self.index + 1 < self.frame_count {
                self.index += 1;
            } else if self.looping {
                self.index = 0;
            } else {
                self.finished = true;
                self.elapsed = Duration::ZERO;
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed = Duration::ZERO;
        self.finished = false;
    }

    /// Jumps to `index` (clamped) with the in-frame timer zeroed.
    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.frame_count - 1);
        self.elapsed = Duration::ZERO;
        self.finished = false;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn sequence(&self) -> SpriteSequence {
        self.sequence
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Total time a non-looping clip needs before it reports finished.
    pub fn duration(&self) -> Duration {
        self.interval * self.frame_count as u32
    }
}

// ====== Sprite catalog ======

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("no frames registered for sprite sequence {0}")]
    MissingSequence(String),
    #[error("sprite sequence {0} was registered with zero frames")]
    EmptySequence(String),
}

pub const PLACEHOLDER_FRAME: &str = "placeholder:missing";

/// Maps logical sequences to renderable frame ids. Misses resolve to a placeholder.
#[derive(Resource, Debug)]
pub struct SpriteCatalog {
    frames: HashMap<SpriteSequence, Vec<String>>,
    placeholder: Vec<String>,
    warned: HashSet<SpriteSequence>,
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self {
            frames: HashMap::new(),
            placeholder: vec![PLACEHOLDER_FRAME.to_string()],
            warned: HashSet::new(),
        }
    }
}

impl SpriteCatalog {
    /// Catalog with one `name/NN` frame id per frame of every known clip.
    pub fn with_builtin_frames() -> Self {
        let mut catalog = Self::default();
        for kind in [ActorKind::Player, ActorKind::Grunt, ActorKind::Boss] {
            for pose in Pose::ALL {
                let seq = SpriteSequence::Actor(kind, pose);
                let count = seq.expected_frames();
                if count > 0 {
                    catalog.register(seq, (0..count).map(|i| format!("{}/{i:02}", seq.name())).collect());
                }
            }
        }
        catalog.register(SpriteSequence::Gem, vec!["gem:idle/00".to_string()]);
        catalog
    }

    pub fn register(&mut self, seq: SpriteSequence, frames: Vec<String>) {
        self.warned.remove(&seq);
        self.frames.insert(seq, frames);
    }

    pub fn try_resolve(&self, seq: SpriteSequence) -> Result<&[String], AssetError> {
        match self.frames.get(&seq) {
            None => Err(AssetError::MissingSequence(seq.name())),
            Some(frames) if frames.is_empty() => Err(AssetError::EmptySequence(seq.name())),
            Some(frames) => Ok(frames.as_slice()),
        }
    }

    /// Never fails; a missing or empty sequence yields the placeholder and warns once.
    pub fn resolve(&mut self, seq: SpriteSequence) -> &[String] {
        if let Some(err) = self.try_resolve(seq).err() {
            if self.warned.insert(seq) {
                warn!("{err}; substituting placeholder");
            }
            return &self.placeholder;
        }
        self.frames.get(&seq).map_or(&self.placeholder, Vec::as_slice)
    }

    /// Frame id for `index`, wrapping so a short sheet never indexes out of range.
    pub fn frame(&mut self, seq: SpriteSequence, index: usize) -> &str {
        let frames = self.resolve(seq);
        &frames[index % frames.len()]
    }
}
