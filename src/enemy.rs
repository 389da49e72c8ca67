use std::time::Duration;

use crate::arena::{ArenaSet, ArenaTick, StepDelta};
use crate::audio::AudioCue;
use crate::character::Player;
use crate::combat::Swing;
use crate::prelude::*;
use crate::tuning::{AiRanges, WorldBounds};

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GrowlTimer>().add_systems(
            ArenaTick,
            (
                (tick_hurt_freeze, growl).in_set(ArenaSet::Timers),
                think.in_set(ArenaSet::Think),
                advance_enemy_animation.in_set(ArenaSet::Animate),
            ),
        );
    }
}

// ====== Tags & data ======
#[derive(Component)]
pub struct Enemy;

/// Range-based brain shared by grunts and the boss.
#[derive(Component, Debug, Clone, Copy)]
pub struct EnemyAi {
    pub ranges: AiRanges,
    /// Held in Idle until the arena opens. Only the boss spawns locked.
    pub gate_locked: bool,
}

/// What the brain wants this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiDecision {
    Hold,
    Chase { step: i32 },
    Attack,
}

impl EnemyAi {
    pub fn decide(&self, own_x: i32, target_x: i32, speed: i32) -> AiDecision {
        if self.gate_locked {
            return AiDecision::Hold;
        }
        let dx = target_x - own_x;
        let dist = dx.abs();
        if dist < self.ranges.attack_range {
            AiDecision::Attack
        } else if dist < self.ranges.chase_range {
            AiDecision::Chase { step: dx.signum() * speed }
        } else {
            AiDecision::Hold
        }
    }
}

/// Boss stagger. While the timer runs, neither the brain nor the clip advance.
#[derive(Component, Debug, Default)]
pub struct HurtFreeze(Option<Timer>);

impl HurtFreeze {
    pub fn active(&self) -> bool {
        self.0.is_some()
    }

    pub fn start(&mut self, window: Duration) {
        self.0 = Some(Timer::new(window, TimerMode::Once));
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Returns true on the tick the freeze runs out.
    fn tick(&mut self, dt: Duration) -> bool {
        let Some(timer) = &mut self.0 else {
            return false;
        };
        timer.tick(dt);
        if timer.finished() {
            self.0 = None;
            return true;
        }
        false
    }
}

#[derive(Resource, Debug)]
pub struct GrowlTimer(pub Timer);

impl FromWorld for GrowlTimer {
    fn from_world(world: &mut World) -> Self {
        let interval = world
            .get_resource::<ArenaTuning>()
            .map_or_else(|| ArenaTuning::default().growl_interval(), ArenaTuning::growl_interval);
        Self(Timer::new(interval, TimerMode::Repeating))
    }
}

// ====== Bundles ======
#[derive(Bundle)]
pub struct EnemyBundle {
    enemy: Enemy,
    kind: ActorKind,
    vitals: Vitals,
    placement: Placement,
    state: ActorState,
    swing: Swing,
    ai: EnemyAi,
    name: Name,
}

pub fn spawn_grunt(cmd: &mut Commands, x: i32, tuning: &ArenaTuning) -> Entity {
    cmd.spawn(EnemyBundle {
        enemy: Enemy,
        kind: ActorKind::Grunt,
        vitals: Vitals::new(tuning.grunt),
        placement: Placement::new(x, grunt_ground_y(&tuning.world), false),
        state: ActorState::new(ActorKind::Grunt),
        swing: Swing::default(),
        ai: EnemyAi { ranges: tuning.grunt_ai, gate_locked: false },
        name: Name::new("Grunt"),
    })
    .id()
}

pub fn spawn_boss(cmd: &mut Commands, tuning: &ArenaTuning) -> Entity {
    let world = &tuning.world;
    let size = ActorKind::Boss.frame_size();
    cmd.spawn((
        EnemyBundle {
            enemy: Enemy,
            kind: ActorKind::Boss,
            vitals: Vitals::new(tuning.boss),
            placement: Placement::new(world.right - size.x, boss_ground_y(world), true),
            state: ActorState::new(ActorKind::Boss),
            swing: Swing::default(),
            ai: EnemyAi { ranges: tuning.boss_ai, gate_locked: true },
            name: Name::new("Boss"),
        },
        HurtFreeze::default(),
    ))
    .id()
}

pub fn grunt_ground_y(world: &WorldBounds) -> i32 {
    world.height - ActorKind::Grunt.frame_size().y + 30
}

pub fn boss_ground_y(world: &WorldBounds) -> i32 {
    world.height - ActorKind::Boss.frame_size().y - world.ground_margin + 35
}

// ====== Systems ======
pub(crate) fn tick_hurt_freeze(dt: Res<StepDelta>, mut q: Query<(&mut HurtFreeze, &mut ActorState)>) {
    for (mut freeze, mut state) in &mut q {
        if freeze.tick(dt.0) && !state.is_dying() {
            state.enter(Pose::Idle);
        }
    }
}

pub(crate) fn think(
    players: Query<&Placement, With<Player>>,
    mut enemies: Query<
        (&EnemyAi, &Vitals, &mut ActorState, &mut Placement, Option<&HurtFreeze>),
        (With<Enemy>, Without<Player>),
    >,
) {
    let Ok(target) = players.single() else {
        return;
    };
    let target_x = target.pos.x;
    for (ai, vitals, mut state, mut placement, freeze) in &mut enemies {
        let frozen = freeze.is_some_and(HurtFreeze::active);
        if vitals.dead()
            || state.vanished()
            || state.is_attacking()
            || state.pose() == Pose::Hurt
            || state.is_dying()
            || frozen
        {
            continue;
        }
        placement.face_toward(target_x);
        match ai.decide(placement.pos.x, target_x, vitals.move_speed) {
            AiDecision::Hold => state.enter(Pose::Idle),
            AiDecision::Attack => state.enter(Pose::Attack1),
            AiDecision::Chase { step } => {
                placement.pos.x += step;
                state.enter(Pose::Walk);
            }
        }
    }
}

pub(crate) fn advance_enemy_animation(
    dt: Res<StepDelta>,
    mut q: Query<(&mut ActorState, Option<&HurtFreeze>), With<Enemy>>,
) {
    for (mut state, freeze) in &mut q {
        if freeze.is_some_and(HurtFreeze::active) {
            continue;
        }
        if !state.advance(dt.0) {
            continue;
        }
        let kind = state.kind();
        match (kind, state.pose()) {
            // boss chains its combo, grunts go back to walking
            (ActorKind::Boss, Pose::Attack1) => state.enter(Pose::Attack2),
            (_, Pose::Attack1 | Pose::Attack2 | Pose::Hurt) => state.enter(kind.rest_pose()),
            _ => {}
        }
    }
}

pub(crate) fn growl(
    dt: Res<StepDelta>,
    mut timer: ResMut<GrowlTimer>,
    grunts: Query<(&ActorKind, &Vitals), With<Enemy>>,
    mut cues: EventWriter<AudioCue>,
) {
    timer.0.tick(dt.0);
    if !timer.0.just_finished() {
        return;
    }
    for (kind, vitals) in &grunts {
        if *kind == ActorKind::Grunt && !vitals.dead() {
            cues.write(AudioCue::Growl);
        }
    }
}
