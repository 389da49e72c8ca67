use std::time::Duration;

use crate::arena::{ArenaSet, ArenaTick, StepDelta};
use crate::audio::AudioCue;
use crate::combat::Swing;
use crate::prelude::*;
use crate::tuning::WorldBounds;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerInput>().add_systems(
            ArenaTick,
            (
                drive_player.in_set(ArenaSet::Input),
                tick_player_timers.in_set(ArenaSet::Timers),
                advance_player_animation.in_set(ArenaSet::Animate),
            ),
        );
    }
}

#[derive(Component)]
pub struct Player;

/// Edge-triggered player input, collected outside the tick.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    MoveLeftPressed,
    MoveLeftReleased,
    MoveRightPressed,
    MoveRightReleased,
    AttackPressed,
}

#[derive(Component, Debug, Default)]
pub struct PlayerControl {
    pub left_held: bool,
    pub right_held: bool,
    pub combo_queued: bool,
    grace: Option<Timer>,
}

impl PlayerControl {
    pub fn grace_open(&self) -> bool {
        self.grace.as_ref().is_some_and(|t| !t.finished())
    }

    fn open_grace(&mut self, window: Duration) {
        self.grace = Some(Timer::new(window, TimerMode::Once));
    }

    fn close_grace(&mut self) {
        self.grace = None;
    }

    /// -1, 0 or 1 from the held keys; opposing keys cancel out.
    pub fn axis(&self) -> i32 {
        self.right_held as i32 - self.left_held as i32
    }
}

/// i-frames. While active, incoming damage is dropped and the window is not extended.
#[derive(Component, Debug, Default)]
pub struct Invulnerability(Option<Timer>);

impl Invulnerability {
    pub fn active(&self) -> bool {
        self.0.as_ref().is_some_and(|t| !t.finished())
    }

    pub fn start(&mut self, window: Duration) {
        self.0 = Some(Timer::new(window, TimerMode::Once));
    }

    pub fn remaining(&self) -> Duration {
        self.0.as_ref().map_or(Duration::ZERO, Timer::remaining)
    }

    fn tick(&mut self, dt: Duration) {
        if let Some(timer) = &mut self.0 {
            timer.tick(dt);
            if timer.finished() {
                self.0 = None;
            }
        }
    }
}

#[derive(Bundle)]
pub struct PlayerBundle {
    player: Player,
    kind: ActorKind,
    vitals: Vitals,
    placement: Placement,
    state: ActorState,
    swing: Swing,
    control: PlayerControl,
    invuln: Invulnerability,
    name: Name,
}

pub fn spawn_player(cmd: &mut Commands, tuning: &ArenaTuning) -> Entity {
    let world = &tuning.world;
    cmd.spawn(PlayerBundle {
        player: Player,
        kind: ActorKind::Player,
        vitals: Vitals::new(tuning.player),
        placement: Placement::new(world.left, player_ground_y(world), false),
        state: ActorState::new(ActorKind::Player),
        swing: Swing::default(),
        control: PlayerControl::default(),
        invuln: Invulnerability::default(),
        name: Name::new("Player"),
    })
    .id()
}

pub fn player_ground_y(world: &WorldBounds) -> i32 {
    (world.height - ActorKind::Player.frame_size().y - world.ground_margin).max(0)
}

fn movement_pose(control: &PlayerControl) -> Pose {
    if control.axis() != 0 { Pose::Run } else { Pose::Idle }
}

fn start_attack(state: &mut ActorState, pose: Pose, cues: &mut EventWriter<AudioCue>) {
    state.enter(pose);
    cues.write(AudioCue::AttackSwing(ActorKind::Player));
}

pub(crate) fn drive_player(
    mut inputs: EventReader<PlayerInput>,
    mut q: Query<(&mut PlayerControl, &mut ActorState, &mut Placement, &Vitals), With<Player>>,
    mut cues: EventWriter<AudioCue>,
) {
    let Ok((mut control, mut state, mut placement, vitals)) = q.single_mut() else {
        inputs.clear();
        return;
    };
    if state.is_dying() || state.vanished() || vitals.dead() {
        inputs.clear();
        return;
    }

    for input in inputs.read() {
        match input {
            PlayerInput::MoveLeftPressed => {
                control.left_held = true;
                placement.facing_left = true;
            }
            PlayerInput::MoveLeftReleased => control.left_held = false,
            PlayerInput::MoveRightPressed => {
                control.right_held = true;
                placement.facing_left = false;
            }
            PlayerInput::MoveRightReleased => control.right_held = false,
            PlayerInput::AttackPressed => match state.pose() {
                Pose::Attack1 => control.combo_queued = true,
                Pose::Attack2 => {}
                _ if control.grace_open() => {
                    control.close_grace();
                    start_attack(&mut state, Pose::Attack2, &mut cues);
                }
                _ => start_attack(&mut state, Pose::Attack1, &mut cues),
            },
        }
    }

    if state.is_attacking() {
        return;
    }
    let axis = control.axis();
    if axis != 0 {
        placement.facing_left = axis < 0;
        placement.pos.x += axis * vitals.move_speed;
    }
    state.enter(movement_pose(&control));
}

pub(crate) fn tick_player_timers(
    dt: Res<StepDelta>,
    mut q: Query<(&mut PlayerControl, &mut Invulnerability), With<Player>>,
) {
    for (mut control, mut invuln) in &mut q {
        invuln.tick(dt.0);
        if let Some(grace) = &mut control.grace {
            grace.tick(dt.0);
            if grace.finished() {
                control.close_grace();
            }
        }
    }
}

pub(crate) fn advance_player_animation(
    dt: Res<StepDelta>,
    tuning: Res<ArenaTuning>,
    mut q: Query<(&mut PlayerControl, &mut ActorState), With<Player>>,
    mut cues: EventWriter<AudioCue>,
) {
    for (mut control, mut state) in &mut q {
        if !state.advance(dt.0) {
            continue;
        }
        match state.pose() {
            Pose::Attack1 if control.combo_queued => {
                control.combo_queued = false;
                start_attack(&mut state, Pose::Attack2, &mut cues);
            }
            Pose::Attack1 => {
                state.enter(movement_pose(&control));
                control.open_grace(tuning.combo_grace());
            }
            Pose::Attack2 => {
                control.combo_queued = false;
                state.enter(movement_pose(&control));
            }
            _ => {}
        }
    }
}
