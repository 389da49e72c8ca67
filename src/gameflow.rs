use crate::actor::{hitbox, overlaps};
use crate::audio::AudioCue;
use crate::character::Player;
use crate::enemy::{EnemyAi, spawn_boss, spawn_grunt};
use crate::prelude::*;
use crate::arena::{ArenaSet, ArenaTick};
use crate::tuning::WorldBounds;

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EncounterEnded>()
            .add_systems(Startup, setup_encounter)
            .add_systems(
                ArenaTick,
                (
                    check_gate.in_set(ArenaSet::Gate),
                    clamp_player.in_set(ArenaSet::Bounds),
                    advance_progression.in_set(ArenaSet::Progression),
                ),
            );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Sent once, on the tick the encounter latches an outcome.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterEnded {
    pub outcome: Outcome,
}

pub const GEM_SIZE: IVec2 = IVec2::new(96, 144);

/// Victory pickup dropped where the boss fell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gem {
    pub pos: IVec2,
    pub picked: bool,
}

impl Gem {
    /// Centred on `center`.
    pub fn at(center: IVec2) -> Self {
        Self { pos: center - GEM_SIZE / 2, picked: false }
    }

    pub fn pickup_box(&self) -> IRect {
        let inset = GEM_SIZE.x.min(GEM_SIZE.y) / 6;
        IRect::new(
            self.pos.x + inset,
            self.pos.y + inset,
            self.pos.x + GEM_SIZE.x - inset,
            self.pos.y + GEM_SIZE.y - inset,
        )
    }
}

/// Session aggregate: roster plus progression flags. Frozen once an outcome is set.
#[derive(Resource, Debug)]
pub struct Encounter {
    pub player: Entity,
    pub grunts: Vec<Entity>,
    pub boss: Entity,
    arena_unlocked: bool,
    roared: bool,
    gem: Option<Gem>,
    outcome: Option<Outcome>,
}

impl Encounter {
    pub fn new(player: Entity, grunts: Vec<Entity>, boss: Entity) -> Self {
        Self {
            player,
            grunts,
            boss,
            arena_unlocked: false,
            roared: false,
            gem: None,
            outcome: None,
        }
    }

    pub fn arena_unlocked(&self) -> bool {
        self.arena_unlocked
    }

    pub fn gem(&self) -> Option<Gem> {
        self.gem
    }

    pub fn gem_spawned(&self) -> bool {
        self.gem.is_some()
    }

    pub fn gem_picked(&self) -> bool {
        self.gem.is_some_and(|g| g.picked)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn victory(&self) -> bool {
        self.outcome == Some(Outcome::Victory)
    }

    pub fn defeat(&self) -> bool {
        self.outcome == Some(Outcome::Defeat)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Right edge the player may reach: the left half until the gate opens.
    pub fn allowed_right(&self, world: &WorldBounds) -> i32 {
        if self.arena_unlocked { world.right } else { world.half_right }
    }
}

/// Spawns the roster for one encounter and returns its aggregate.
pub fn spawn_encounter(cmd: &mut Commands, tuning: &ArenaTuning) -> Encounter {
    let player = crate::character::spawn_player(cmd, tuning);
    let grunts = tuning
        .grunt_spawn_x
        .iter()
        .map(|&x| spawn_grunt(cmd, x, tuning))
        .collect();
    let boss = spawn_boss(cmd, tuning);
    Encounter::new(player, grunts, boss)
}

pub(crate) fn setup_encounter(mut commands: Commands, tuning: Res<ArenaTuning>) {
    let encounter = spawn_encounter(&mut commands, &tuning);
    info!("encounter ready: {} grunts guarding the arena", encounter.grunts.len());
    commands.insert_resource(encounter);
}

// ====== Tick stages ======
pub(crate) fn check_gate(
    mut encounter: ResMut<Encounter>,
    actors: Query<&ActorState>,
    mut brains: Query<&mut EnemyAi>,
    mut cues: EventWriter<AudioCue>,
) {
    if encounter.arena_unlocked {
        return;
    }
    let cleared = encounter
        .grunts
        .iter()
        .all(|&g| actors.get(g).map_or(true, ActorState::vanished));
    if !cleared {
        return;
    }
    encounter.arena_unlocked = true;
    if let Ok(mut ai) = brains.get_mut(encounter.boss) {
        ai.gate_locked = false;
    }
    if !encounter.roared {
        encounter.roared = true;
        cues.write(AudioCue::Roar);
    }
    info!("arena unlocked, the boss wakes");
}

pub(crate) fn clamp_player(
    encounter: Res<Encounter>,
    tuning: Res<ArenaTuning>,
    mut q: Query<&mut Placement, With<Player>>,
) {
    let world = &tuning.world;
    let max_x = encounter.allowed_right(world) - ActorKind::Player.frame_size().x;
    for mut placement in &mut q {
        let IVec2 { x, y } = placement.pos;
        if x < world.left || x > max_x {
            placement.set_position_clamped(x, y, world.left, max_x);
        }
    }
}

pub(crate) fn advance_progression(
    mut encounter: ResMut<Encounter>,
    actors: Query<(&ActorState, &Placement)>,
    mut cues: EventWriter<AudioCue>,
    mut ended: EventWriter<EncounterEnded>,
) {
    if encounter.is_over() {
        return;
    }

    if encounter.gem.is_none() {
        if let Ok((boss, placement)) = actors.get(encounter.boss) {
            if boss.vanished() {
                let center = hitbox(ActorKind::Boss, placement, false).center();
                encounter.gem = Some(Gem::at(center));
                info!("boss fell, gem dropped at {center}");
            }
        }
    }

    let Ok((player, placement)) = actors.get(encounter.player) else {
        return;
    };
    let body = hitbox(ActorKind::Player, placement, player.vanished());

    let outcome = match &mut encounter.gem {
        Some(gem) if !gem.picked && overlaps(body, gem.pickup_box()) => {
            gem.picked = true;
            cues.write(AudioCue::Pickup);
            Some(Outcome::Victory)
        }
        _ if player.vanished() => Some(Outcome::Defeat),
        _ => None,
    };

    if let Some(outcome) = outcome {
        encounter.outcome = Some(outcome);
        ended.write(EncounterEnded { outcome });
        info!("encounter over: {outcome:?}");
    }
}
