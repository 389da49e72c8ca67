use std::path::PathBuf;
use std::time::Duration;

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};

use crate::audio::AudioCue;
use crate::camera::CameraFollowPlugin;
use crate::character::{PlayerInput, PlayerPlugin};
use crate::combat::{CombatPlugin, MeleeHit};
use crate::enemy::EnemyPlugin;
use crate::gameflow::{Encounter, EncounterEnded, GameFlowPlugin, Outcome, spawn_encounter};
use crate::hud::{ArenaView, HudPlugin};
use crate::prelude::*;
use crate::tuning::{ActorStats, AiRanges, WorldBounds};

/// One fixed simulation step.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArenaTick;

/// Simulated time covered by the current step, already clamped.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct StepDelta(pub Duration);

/// Stages of one tick, run in declaration order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum ArenaSet {
    Gate,
    Input,
    Timers,
    Think,
    Animate,
    Bounds,
    Camera,
    Combat,
    Progression,
    Publish,
}

/// Maps a raw frame delta onto the step actually simulated.
pub fn clamp_step(dt: Duration, max_step: Duration) -> Duration {
    dt.min(max_step)
}

fn configure_tick(schedule: &mut Schedule) {
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.configure_sets(
        (
            ArenaSet::Gate,
            ArenaSet::Input,
            ArenaSet::Timers,
            ArenaSet::Think,
            ArenaSet::Animate,
            ArenaSet::Bounds,
            ArenaSet::Camera,
            ArenaSet::Combat,
            ArenaSet::Progression,
            ArenaSet::Publish,
        )
            .chain(),
    );
}

// ====== App wiring ======

enum TuningSource {
    File(PathBuf),
    Value(ArenaTuning),
}

/// Runs the encounter inside an `App`, one step per `FixedUpdate`.
pub struct ArenaPlugin {
    source: TuningSource,
}

impl ArenaPlugin {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { source: TuningSource::File(path.into()) }
    }

    pub fn with_tuning(tuning: ArenaTuning) -> Self {
        Self { source: TuningSource::Value(tuning) }
    }

    pub fn with_defaults() -> Self {
        Self::with_tuning(ArenaTuning::default())
    }
}

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        let tuning = match &self.source {
            TuningSource::File(path) => ArenaTuning::load_or_default(path),
            TuningSource::Value(tuning) => tuning.clone(),
        };
        app.insert_resource(Time::<Fixed>::from_duration(tuning.tick()))
            .insert_resource(tuning)
            .init_resource::<StepDelta>()
            .register_type::<ArenaTuning>()
            .register_type::<ActorStats>()
            .register_type::<AiRanges>()
            .register_type::<WorldBounds>()
            .register_type::<ActorKind>()
            .register_type::<Vitals>()
            .register_type::<Placement>()
            .add_event::<AudioCue>()
            .init_schedule(ArenaTick)
            .edit_schedule(ArenaTick, configure_tick)
            .add_plugins((
                GameFlowPlugin,
                PlayerPlugin,
                EnemyPlugin,
                CombatPlugin,
                CameraFollowPlugin,
                HudPlugin,
            ))
            .add_systems(FixedUpdate, run_arena_tick);
    }
}

pub fn run_arena_tick(world: &mut World) {
    if world.get_resource::<Encounter>().is_none_or(Encounter::is_over) {
        return;
    }
    let step = world.resource::<ArenaTuning>().tick();
    world.resource_mut::<StepDelta>().0 = step;
    world.run_schedule(ArenaTick);
}

// ====== Headless harness ======

/// Drives the same plugins as the game, one explicit `dt` at a time, without
/// running the app's main loop.
pub struct ArenaSim {
    app: App,
    cues: Vec<AudioCue>,
    ended: Option<Outcome>,
    ticks: u64,
}

impl ArenaSim {
    pub fn new(tuning: ArenaTuning) -> Self {
        let mut app = App::new();
        app.add_plugins(ArenaPlugin::with_tuning(tuning));

        let world = app.world_mut();
        let tuning = world.resource::<ArenaTuning>().clone();
        let encounter = {
            let mut commands = world.commands();
            spawn_encounter(&mut commands, &tuning)
        };
        world.flush();
        world.insert_resource(encounter);

        Self { app, cues: Vec::new(), ended: None, ticks: 0 }
    }

    /// Queues an input for the next tick.
    pub fn press(&mut self, input: PlayerInput) {
        self.app.world_mut().send_event(input);
    }

    /// Advances one step. A no-op once the encounter has an outcome, and for
    /// a zero step: no simulated time means nothing moves.
    pub fn tick(&mut self, dt: Duration) {
        if self.is_over() {
            return;
        }
        let world = self.app.world_mut();
        let step = clamp_step(dt, world.resource::<ArenaTuning>().max_step());
        if step.is_zero() {
            return;
        }
        world.resource_mut::<StepDelta>().0 = step;
        world.resource_mut::<Events<PlayerInput>>().update();
        world.resource_mut::<Events<MeleeHit>>().update();

        world.run_schedule(ArenaTick);
        self.ticks += 1;

        self.cues.extend(world.resource_mut::<Events<AudioCue>>().drain());
        if let Some(end) = world.resource_mut::<Events<EncounterEnded>>().drain().last() {
            self.ended = Some(end.outcome);
        }
    }

    /// Millisecond convenience; negative deltas count as zero.
    pub fn tick_ms(&mut self, ms: i64) {
        self.tick(Duration::from_millis(ms.max(0) as u64));
    }

    /// Runs `n` steps of the configured tick length.
    pub fn run_ticks(&mut self, n: u32) {
        let step = self.tuning().tick();
        for _ in 0..n {
            self.tick(step);
        }
    }

    pub fn is_over(&self) -> bool {
        self.encounter().is_over()
    }

    pub fn encounter(&self) -> &Encounter {
        self.app.world().resource::<Encounter>()
    }

    pub fn view(&self) -> &ArenaView {
        self.app.world().resource::<ArenaView>()
    }

    pub fn tuning(&self) -> &ArenaTuning {
        self.app.world().resource::<ArenaTuning>()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Outcome reported through `EncounterEnded`, if any.
    pub fn ended(&self) -> Option<Outcome> {
        self.ended
    }

    /// Every cue fired since the last call.
    pub fn take_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.app.world().get::<C>(entity)
    }

    pub fn get_mut<C: Component<Mutability = bevy::ecs::component::Mutable>>(
        &mut self,
        entity: Entity,
    ) -> Option<Mut<'_, C>> {
        self.app.world_mut().get_mut::<C>(entity)
    }
}
